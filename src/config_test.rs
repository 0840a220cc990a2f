/// Tests for config module
#[cfg(test)]
mod tests {
    use crate::cli::{CliArgs, Command, default_data_dir};
    use crate::config::*;
    use crate::types::OwnerId;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn args(user: Option<&str>, data_dir: Option<&str>) -> CliArgs {
        CliArgs {
            user: user.map(String::from),
            data_dir: data_dir.map(PathBuf::from),
            no_color: false,
            console_width: None,
            command: Command::History { json: false },
        }
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_user_flag_wins_over_environment() {
        let config =
            build_app_config_with(&args(Some("alice"), None), env_of(&[(USER_ENV, "bob"), ("USER", "carol")])).unwrap();
        assert_eq!(config.owner, OwnerId::new("alice"));
    }

    #[test]
    fn test_user_env_before_login_name() {
        let config = build_app_config_with(&args(None, None), env_of(&[(USER_ENV, "bob"), ("USER", "carol")])).unwrap();
        assert_eq!(config.owner, OwnerId::new("bob"));
    }

    #[test]
    fn test_falls_back_to_login_name() {
        let config = build_app_config_with(&args(None, None), env_of(&[(USER_ENV, "  "), ("USERNAME", "dave")])).unwrap();
        assert_eq!(config.owner, OwnerId::new("dave"));
    }

    #[test]
    fn test_missing_user_is_an_error() {
        let err = build_app_config_with(&args(None, None), env_of(&[])).unwrap_err();
        assert!(err.contains("--user"));
    }

    #[test]
    fn test_data_dir_resolution_order() {
        let flag = build_app_config_with(&args(Some("a"), Some("/tmp/flag")), env_of(&[(DATA_DIR_ENV, "/tmp/env")]))
            .unwrap();
        assert_eq!(flag.data_dir, PathBuf::from("/tmp/flag"));
        assert_eq!(flag.uploads_dir, PathBuf::from("/tmp/flag").join(UPLOADS_DIR));

        let from_env = build_app_config_with(&args(Some("a"), None), env_of(&[(DATA_DIR_ENV, "/tmp/env")])).unwrap();
        assert_eq!(from_env.data_dir, PathBuf::from("/tmp/env"));

        let fallback = build_app_config_with(&args(Some("a"), None), env_of(&[])).unwrap();
        assert_eq!(fallback.data_dir, default_data_dir());
    }

    #[test]
    fn test_no_color_flag() {
        let mut a = args(Some("a"), None);
        a.no_color = true;
        assert!(!build_app_config_with(&a, env_of(&[])).unwrap().use_colors);
    }
}
