#[cfg(test)]
pub mod test {
    use std::collections::{BTreeMap, HashMap};

    use crate::record;

    #[derive(Debug, Clone, PartialEq)]
    pub struct CommonConf {
        pub mode: String,
        pub app_name: String,
    }

    record! {
        CommonConf {
            mode: r#"default:"dev" option:"dev,prod""#,
            app_name: r#"json:"appName" yaml:"appName" toml:"appName" default:"commonApp" valid:"required""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Redis {
        pub host: String,
        pub port: i64,
        pub db: i8,
        pub enable: bool,
    }

    record! {
        Redis {
            host: r#"json:"host" yaml:"host" toml:"host" default:"127.0.0.1""#,
            port: r#"json:"port" yaml:"port" toml:"port" default:"5678" desc:"Redis port""#,
            db: r#"json:"DB" yaml:"db" toml:"db" default:"5""#,
            enable: r#"json:"enable" yaml:"enable" toml:"enable" default:"true""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Logger {
        pub name: String,
        pub level: String,
        pub output: Vec<String>,
    }

    record! {
        Logger {
            name: r#"default:"appLog""#,
            level: r#"default:"debug""#,
            output: r#"default:"stdio,file://""#,
        }
    }

    /// The value every defaulted [`Logger`] ends up with.
    pub fn sample_logger() -> Logger {
        Logger {
            name: "appLog".into(),
            level: "debug".into(),
            output: vec!["stdio".into(), "file://".into()],
        }
    }

    /// Exercises every container kind the engine walks.
    #[derive(Debug, Clone, PartialEq)]
    pub struct LocalConf {
        pub loggers: Vec<Logger>,
        pub boxed_loggers: Vec<Option<Box<Logger>>>,
        pub white_ip: Vec<String>,
        pub log_map: HashMap<String, Logger>,
        pub log_map2: BTreeMap<i32, Logger>,
        pub cfg_file: String,
        pub common: Option<Box<CommonConf>>,
        pub app_name: String,
        pub redis: Option<Box<Redis>>,
    }

    record! {
        LocalConf {
            loggers: r#"json:"l" yaml:"l" toml:"l" default:"0,1,2,3""#,
            boxed_loggers: r#"json:"log2" yaml:"log2" toml:"log2" default:"0,1,2,3""#,
            white_ip: r#"json:"whiteIP" yaml:"whiteIP" toml:"whiteIP" default:"127.0.0.1,10.0.0.1,198.0.0.1""#,
            log_map: r#"json:"logMap" yaml:"logMap" toml:"logMap" default:"default,app,server""#,
            log_map2: r#"json:"logMap2" yaml:"logMap2" toml:"logMap2" default:"1,2,3""#,
            #[readonly]
            cfg_file: r#"default:"cfgFile""#,
            common: r#"json:"common" yaml:"common" toml:"common""#,
            app_name: r#"json:"appName" yaml:"appName" toml:"appName" default:"demoApp""#,
            redis: r#"json:"redis" yaml:"redis" toml:"redis" desc:"Redis connection""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Flags {
        pub skipped: i32,
        pub empty: String,
        pub empty_list: Vec<String>,
        pub verbose: bool,
        pub ratio: f64,
        pub retries: Option<u8>,
    }

    record! {
        Flags {
            skipped: r#"default:"-""#,
            empty: r#"default:"""#,
            empty_list: r#"default:"""#,
            verbose: r#"default:"true""#,
            ratio: r#"default:"0.5""#,
            retries: r#"default:"3""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Nested {
        pub deep: Option<Option<Redis>>,
    }

    record! {
        Nested {
            deep: r#"yaml:"deep""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Small {
        pub small: i8,
    }

    record! {
        Small {
            small: r#"default:"300""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Overflow {
        pub inner: Small,
    }

    record! {
        Overflow {
            inner: "",
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DefaultOnParent {
        pub redis: Option<Redis>,
    }

    record! {
        DefaultOnParent {
            redis: r#"yaml:"redis" default:"localhost""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DefaultOnDeepParent {
        pub inner: Option<Option<Redis>>,
    }

    record! {
        DefaultOnDeepParent {
            inner: r#"yaml:"inner" default:"ignored-text""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DuplicateIdent {
        pub first: String,
        pub second: String,
    }

    record! {
        DuplicateIdent {
            first: r#"json:"first" yaml:"name""#,
            second: r#"json:"second" yaml:"name""#,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct WithChar {
        pub initial: char,
    }

    record! {
        WithChar {
            initial: "",
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct BadKeyMap {
        pub flags: BTreeMap<bool, String>,
    }

    record! {
        BadKeyMap {
            flags: "",
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Chain {
        pub next: Option<Box<Chain>>,
    }

    record! {
        Chain {
            next: "",
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::{Record, Reflect};

        #[test]
        fn fields_follow_declaration_order() {
            let names: Vec<_> = LocalConf::FIELDS.iter().map(|f| f.name).collect();
            assert_eq!(
                names,
                [
                    "loggers",
                    "boxed_loggers",
                    "white_ip",
                    "log_map",
                    "log_map2",
                    "cfg_file",
                    "common",
                    "app_name",
                    "redis",
                ]
            );
            assert_eq!(LocalConf::zero().values().len(), names.len());
        }

        #[test]
        fn readonly_marks_field_unsettable() {
            let settable: Vec<_> = LocalConf::FIELDS
                .iter()
                .filter(|f| !f.settable)
                .map(|f| f.name)
                .collect();
            assert_eq!(settable, ["cfg_file"]);
        }

        #[test]
        fn zero_is_deep_zero() {
            assert!(LocalConf::zero().is_deep_zero());
            assert!(!sample_logger().is_deep_zero());
        }

        #[test]
        fn record_shape_is_unique_per_type() {
            assert!(std::ptr::eq(Redis::shape(), Redis::zero().type_shape()));
            assert!(!std::ptr::eq(Redis::shape(), Logger::shape()));
        }
    }
}
