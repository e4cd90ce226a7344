use super::Route;

const FOCUSED_TINT: &str = "#0061ff";
const UNFOCUSED_TINT: &str = "#666876";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Explore,
    Profile,
}

impl Tab {
    pub const ALL: [Self; 3] = [Self::Home, Self::Explore, Self::Profile];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Explore => "Explore",
            Self::Profile => "Profile",
        }
    }

    /// Icon asset name.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Explore => "search",
            Self::Profile => "person",
        }
    }

    pub const fn route(self) -> Route {
        match self {
            Self::Home => Route::Home,
            Self::Explore => Route::Explore,
            Self::Profile => Route::Profile,
        }
    }
}

/// One rendered tab bar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
    pub tab: Tab,
    pub title: &'static str,
    pub icon: &'static str,
    pub focused: bool,
    pub tint: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBarStyle {
    pub show_labels: bool,
    pub header_shown: bool,
    pub background: &'static str,
    pub border_top_color: &'static str,
    pub border_top_width: u32,
    pub min_height: u32,
}

impl Default for TabBarStyle {
    fn default() -> Self {
        Self {
            show_labels: false,
            header_shown: false,
            background: "white",
            border_top_color: "#0061FF1A",
            border_top_width: 1,
            min_height: 70,
        }
    }
}

/// Bottom tab navigation shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabsLayout {
    active: Tab,
    style: TabBarStyle,
}

impl Default for TabsLayout {
    fn default() -> Self {
        Self {
            active: Tab::Home,
            style: TabBarStyle::default(),
        }
    }
}

impl TabsLayout {
    pub const fn active(&self) -> Tab {
        self.active
    }

    pub const fn style(&self) -> &TabBarStyle {
        &self.style
    }

    /// Focus `tab` and return the route to show.
    pub fn select(&mut self, tab: Tab) -> Route {
        self.active = tab;
        tab.route()
    }

    /// Focus the tab owning `route`, if any.
    pub fn sync_route(&mut self, route: Route) {
        if let Some(tab) = Tab::ALL.into_iter().find(|tab| tab.route() == route) {
            self.active = tab;
        }
    }

    pub fn items(&self) -> Vec<TabItem> {
        Tab::ALL
            .into_iter()
            .map(|tab| {
                let focused = tab == self.active;
                TabItem {
                    tab,
                    title: tab.title(),
                    icon: tab.icon(),
                    focused,
                    tint: if focused { FOCUSED_TINT } else { UNFOCUSED_TINT },
                }
            })
            .collect()
    }
}
