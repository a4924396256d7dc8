//! Component factory tests
//!
//! Builds components from descriptors the way startup wiring does,
//! including `$property` references into the configuration.

use std::any::Any;
use std::sync::Arc;
use vocalrt::config::Config;
use vocalrt::factory::ComponentRegistry;
use vocalrt::locale::Locale;
use vocalrt::memory::MemoryProbe;
use vocalrt::resource::ResourceParser;
use vocalrt::voice::{SimpleVoice, Voice};
use vocalrt::Error;

#[derive(Debug, PartialEq)]
struct Recorder {
    args: Vec<String>,
}

fn any_registry() -> ComponentRegistry<dyn Any + Send + Sync> {
    let mut registry: ComponentRegistry<dyn Any + Send + Sync> = ComponentRegistry::new();
    registry
        .register("test.Recorder", 0, |_| {
            Ok(Box::new(Recorder {
                args: vec!["<default>".to_string()],
            }))
        })
        .register("test.Recorder", 2, |args| {
            Ok(Box::new(Recorder {
                args: args.to_vec(),
            }))
        })
        .register("test.Failing", 1, |args| {
            Err(Error::Parse(format!("cannot use '{}'", args[0])))
        });
    registry
}

fn recorder(component: Box<dyn Any + Send + Sync>) -> Recorder {
    *component.downcast::<Recorder>().expect("a Recorder")
}

fn voice_registry() -> ComponentRegistry<dyn Voice> {
    let mut registry: ComponentRegistry<dyn Voice> = ComponentRegistry::new();
    registry.register("test.Voice", 2, |args| {
        let locale = Locale::parse(&args[1])
            .ok_or_else(|| Error::Parse(format!("bad locale '{}'", args[1])))?;
        let voice: Box<dyn Voice> = Box::new(SimpleVoice::new(&args[0], locale, None));
        Ok(voice)
    });
    registry
}

#[test]
fn test_default_constructor() {
    let config = Config::from_ini_str("").unwrap();
    let r = recorder(any_registry().instantiate("test.Recorder", &config).unwrap());
    assert_eq!(r.args, vec!["<default>"]);
}

#[test]
fn test_two_trimmed_arguments_in_order() {
    let config = Config::from_ini_str("").unwrap();
    let r = recorder(
        any_registry()
            .instantiate("test.Recorder(  first , second  )", &config)
            .unwrap(),
    );
    assert_eq!(r.args, vec!["first", "second"]);
}

#[test]
fn test_trailing_comma_keeps_arity() {
    let config = Config::from_ini_str("").unwrap();
    let r = recorder(
        any_registry()
            .instantiate("test.Recorder(first,second,)", &config)
            .unwrap(),
    );
    assert_eq!(r.args, vec!["first", "second"]);

    let err = any_registry()
        .instantiate("test.Failing(oops,,)", &config)
        .unwrap_err();
    assert!(err.to_string().contains("cannot use 'oops'"));
}

#[test]
fn test_property_reference() {
    let config = Config::from_ini_str("[voice]\nname =   cmu-slt   \n").unwrap();
    let r = recorder(
        any_registry()
            .instantiate("test.Recorder($voice.name,literal)", &config)
            .unwrap(),
    );
    assert_eq!(r.args, vec!["cmu-slt", "literal"]);
}

#[test]
fn test_missing_property_names_descriptor() {
    let config = Config::from_ini_str("").unwrap();
    let descriptor = "test.Recorder($voice.name,x)";
    let err = any_registry().instantiate(descriptor, &config).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    let text = err.to_string();
    assert!(text.contains(descriptor), "{}", text);
    assert!(text.contains("No such property: voice.name"), "{}", text);
}

#[test]
fn test_constructor_failure_message_is_kept() {
    let config = Config::from_ini_str("").unwrap();
    let err = any_registry()
        .instantiate("test.Failing(oops)", &config)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: Cannot instantiate object from 'test.Failing(oops)': cannot use 'oops'"
    );
}

#[test]
fn test_malformed_descriptor() {
    let config = Config::from_ini_str("").unwrap();
    let err = any_registry()
        .instantiate("test.Recorder(a,b", &config)
        .unwrap_err();
    assert!(err.to_string().contains("missing closing parenthesis"));
}

#[test]
fn test_trait_object_components() {
    let config = Config::from_ini_str("voice.locale = en-US").unwrap();
    let voice: Arc<dyn Voice> = voice_registry()
        .instantiate("test.Voice(cmu-slt, $voice.locale)", &config)
        .unwrap()
        .into();
    assert_eq!(voice.name(), "cmu-slt");
    assert_eq!(voice.locale().to_string(), "en_US");

    let err = voice_registry()
        .instantiate("test.Voice(cmu-slt, ???)", &config)
        .err()
        .unwrap();
    assert!(err.to_string().contains("bad locale '???'"));
}

#[test]
fn test_builtin_components_from_config() {
    let config = Config::from_ini_str(
        "runtime.memoryprobe = vocalrt.memory.FixedMemory($runtime.memorybytes)\n\
         runtime.memorybytes = 123456\n",
    )
    .unwrap();
    let descriptor = config.get_string("runtime.memoryprobe", "");
    let probe = ComponentRegistry::<dyn MemoryProbe>::with_builtins()
        .instantiate(&descriptor, &config)
        .unwrap();
    assert_eq!(probe.available_memory(), 123_456);

    let parser = ComponentRegistry::<dyn ResourceParser>::with_builtins()
        .instantiate("vocalrt.resource.JsonAllophoneParser()", &config)
        .unwrap();
    let json = r#"{"name":"x","locale":"de","allophones":[{"ph":"_","vc":"0"}]}"#;
    let set = parser.parse(&mut json.as_bytes(), "inline").unwrap();
    assert_eq!(set.identifier(), "inline");
}
