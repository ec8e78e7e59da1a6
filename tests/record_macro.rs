use std::collections::HashMap;
use std::net::IpAddr;

use tagfig::{
    BoxError, Bytes, Format, Record, Reflect, Tagfig, TagfigError, TextDecode, Validate,
    VersionedCache, populate_defaults, record, reflect_text,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Off,
    Info,
    Debug,
}

impl TextDecode for Level {
    fn decode_text(text: &str) -> Result<Self, BoxError> {
        match text {
            "off" => Ok(Level::Off),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(format!("unknown level '{other}'").into()),
        }
    }

    fn encode_text(&self) -> String {
        match self {
            Level::Off => "off",
            Level::Info => "info",
            Level::Debug => "debug",
        }
        .to_string()
    }

    fn zero() -> Self {
        Level::Off
    }

    fn is_zero(&self) -> bool {
        *self == Level::Off
    }
}

reflect_text!(Level);

#[derive(Debug, Clone, PartialEq)]
struct Service {
    name: String,
    level: Level,
    listen: IpAddr,
    token: Bytes,
    tags: HashMap<String, String>,
    backend: Option<Backend>,
    secret: String,
}

record! {
    Service {
        name: r#"yaml:"name" json:"name" default:"svc""#,
        level: r#"yaml:"level" json:"level" default:"info""#,
        listen: r#"yaml:"listen" json:"listen" default:"0.0.0.0""#,
        token: r#"yaml:"token" json:"token" default:"aGVsbG8=""#,
        tags: r#"yaml:"tags" json:"tags" default:"env,team""#,
        backend: r#"yaml:"backend" json:"backend""#,
        #[readonly]
        secret: r#"default:"hunter2""#,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Backend {
    url: String,
    retries: u8,
}

record! {
    Backend {
        url: r#"yaml:"url" json:"url" default:"http://localhost""#,
        retries: r#"yaml:"retries" json:"retries" default:"3""#,
    }
}

impl Validate for Service {
    fn validate(&self) -> Result<bool, BoxError> {
        Ok(!self.name.is_empty())
    }
}

#[test]
fn macros_register_fields_outside_the_crate() {
    let names: Vec<_> = Service::FIELDS.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        ["name", "level", "listen", "token", "tags", "backend", "secret"]
    );
    assert!(Service::zero().is_deep_zero());
}

#[test]
fn custom_text_types_take_defaults() {
    let mut service = Service::zero();
    populate_defaults(&mut service, &Default::default()).unwrap();

    assert_eq!(service.name, "svc");
    assert_eq!(service.level, Level::Info);
    assert!(service.listen.is_unspecified());
    assert_eq!(service.token.as_slice(), b"hello");
    assert_eq!(service.tags.len(), 2);
    assert_eq!(service.tags["env"], "");
    assert_eq!(service.backend.as_ref().unwrap().retries, 3);
    assert_eq!(service.secret, "");
}

#[test]
fn bad_custom_text_is_a_parse_error() {
    let err = Tagfig::builder()
        .load::<Service>(b"level: loud\n")
        .unwrap_err();
    match err {
        TagfigError::Parse { path, .. } => assert_eq!(path, "level"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn json_round_trip_with_custom_types() {
    let builder = Tagfig::builder().format(Format::Json).strict(true);
    let service: Service = builder.materialize().unwrap();
    let bytes = builder.encode(&service).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("\"token\": \"aGVsbG8=\""));
    assert!(text.contains("\"level\": \"info\""));
    assert!(!text.contains("secret"));

    let loaded: Service = builder.load(&bytes).unwrap();
    assert_eq!(loaded, service);
}

#[test]
fn loaded_services_are_versioned() {
    let builder = Tagfig::builder();
    let cache = VersionedCache::new(2);
    for doc in ["name: a\n", "name: b\n", "name: c\n"] {
        cache.load(builder.load::<Service>(doc.as_bytes()).unwrap()).unwrap();
    }
    assert_eq!(cache.versions(), [1, 2]);
    assert_eq!(cache.get().unwrap().name, "c");
}
