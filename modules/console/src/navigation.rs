//! Application navigation menu.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem {
        label: "Dashboard",
        path: "/",
    },
    NavItem {
        label: "Processes",
        path: "/processes",
    },
    NavItem {
        label: "Instances",
        path: "/instances",
    },
    NavItem {
        label: "Profiles",
        path: "/profiles",
    },
    NavItem {
        label: "Team",
        path: "/team",
    },
];

/// Menu entry for `path`, ignoring a trailing slash.
#[must_use]
pub fn find(path: &str) -> Option<&'static NavItem> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    let items: &'static [NavItem] = &NAV_ITEMS;
    items.iter().find(|item| item.path == path)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn menu_order_and_paths() {
        let labels: Vec<&str> = NAV_ITEMS.iter().map(|i| i.label).collect();
        assert_eq!(
            labels,
            ["Dashboard", "Processes", "Instances", "Profiles", "Team"]
        );
    }

    #[test]
    fn find_normalizes_trailing_slash() {
        assert_eq!(find("/team/").map(|i| i.label), Some("Team"));
        assert_eq!(find("/").map(|i| i.label), Some("Dashboard"));
        assert_eq!(find("").map(|i| i.label), Some("Dashboard"));
        assert!(find("/billing").is_none());
    }
}
