// Tests for mapping payload formatting
//
// Reports are produced by running small configurations through the core
// engine so the rendered text matches what users see.

use super::*;
use fieldmap_core::{MapOptions, MappingEngine};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn mapping(json_output: bool) -> MappingOutput {
    let config = json!({"mappings": [
        {"source": "user.name", "target": "fullName", "transforms": [{"kind": "trim"}]},
        {"source": "user.email", "target": "email"},
        {"source": "user.ssn", "target": "ssn", "required": true}
    ]});
    let data = json!({"user": {"name": "  Ada ", "email": "ada@example.org"}});
    let options = MapOptions::default().dry_run(false).json_dry_run_output(json_output);
    MappingEngine::map_values(&config, &data, "/2.mapping-config.yml", options).unwrap()
}

fn writer(format: OutputFormat, use_color: bool, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, use_color, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

#[test]
fn test_report_human_format() {
    let output = mapping(true);
    let text = OutputFormat::Human.format_mapping_output(&output, false).unwrap();

    assert!(text.starts_with("=== Mapping Audit Report ==="));
    assert!(text.contains("Config: /2.mapping-config.yml"));
    assert!(text.contains("[SET]     user.name -> fullName"));
    assert!(text.contains("user.email -> email (sensitive)"));
    assert!(text.contains("Reason: missing required"));
    assert!(text.contains("Coverage: 2/3 applied, 1 skipped (66.7%)"));
    assert!(!text.contains("ada@example.org"));
}

#[test]
fn test_report_human_format_colored_keeps_text() {
    colored::control::set_override(true);
    let output = mapping(true);
    let text = OutputFormat::Human.format_mapping_output(&output, true).unwrap();
    colored::control::unset_override();

    assert!(text.contains("\u{1b}["));
    assert!(text.contains("user.name -> fullName"));
}

#[test]
fn test_target_human_format_is_pretty_json() {
    let output = mapping(false);
    let text = OutputFormat::Human.format_mapping_output(&output, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value, json!({"fullName": "Ada", "email": "ada@example.org"}));
    assert!(text.contains('\n'));
}

#[test]
fn test_machine_formats() {
    let output = mapping(true);

    let compact = OutputFormat::Json.format_mapping_output(&output, false).unwrap();
    assert!(!compact.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&compact).unwrap();
    assert_eq!(value["coverage"]["totalMappings"], 3);
    assert_eq!(value["mappings"][2]["action"], "ERROR");

    let yaml = OutputFormat::Yaml.format_mapping_output(&output, false).unwrap();
    let value: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(value["configUsed"], "/2.mapping-config.yml");
}

#[test]
fn test_file_format() {
    assert_eq!(OutputFormat::Human.for_file(), OutputFormat::JsonPretty);
    assert_eq!(OutputFormat::Yaml.for_file(), OutputFormat::Yaml);
}

#[test]
fn test_writer_messages_respect_format_and_quiet() {
    let (mut out, buffer) = writer(OutputFormat::Human, false, false);
    out.info("Mapping data").unwrap();
    out.warning("2 rules failed").unwrap();
    assert_eq!(buffer.contents(), "INFO: Mapping data\nWARNING: 2 rules failed\n");

    let (mut out, buffer) = writer(OutputFormat::Human, false, true);
    out.info("hidden").unwrap();
    out.success("hidden").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut out, buffer) = writer(OutputFormat::Json, false, false);
    out.info("hidden").unwrap();
    out.data(&json!({"ok": true})).unwrap();
    assert_eq!(buffer.contents(), "{\"ok\":true}\n");
}

#[test]
fn test_writer_mapping_output() {
    let (mut out, buffer) = writer(OutputFormat::JsonPretty, false, false);
    out.mapping_output(&mapping(false)).unwrap();

    let value: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
    assert_eq!(value["fullName"], "Ada");
}
