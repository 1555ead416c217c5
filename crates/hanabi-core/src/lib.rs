#![deny(warnings)]
pub mod game;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "hathanabi"
    }

    pub const fn codename() -> &'static str {
        "Hat Guesser"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "hathanabi");
        assert_eq!(AppInfo::codename(), "Hat Guesser");
        assert!(!AppInfo::version().is_empty());
    }
}
