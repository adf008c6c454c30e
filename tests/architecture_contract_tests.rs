//! Architecture contract tests.

mod support;

use support::architecture::{
    find_lines_containing, find_lines_outside_tests, find_non_export_lines_in_mod_files,
    path_exists, read_relative,
};

#[test]
fn cli_has_no_direct_infrastructure_imports() {
    let hits = find_lines_containing(
        "src/adapter/inbound/cli",
        &["use crate::infrastructure", "crate::infrastructure::"],
    );

    assert!(
        hits.is_empty(),
        "found direct infrastructure imports in inbound CLI adapters: {hits:#?}"
    );
}

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "reqwest::",
            "diesel::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain_and_errors() {
    let hits = find_lines_containing(
        "src/port",
        &[
            "use crate::adapter",
            "use crate::application",
            "use crate::infrastructure",
            "diesel::",
            "reqwest::",
        ],
    );

    assert!(hits.is_empty(), "found outer-layer imports in ports: {hits:#?}");
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_lines_outside_tests("src/application", &["crate::adapter::"]);
    assert!(
        hits.is_empty(),
        "application layer should not import adapters directly: {hits:#?}"
    );
}

#[test]
fn sqlite_stays_inside_its_adapter() {
    let hits = find_lines_containing("src/application", &["diesel"]);
    assert!(hits.is_empty(), "diesel used outside the sqlite adapter: {hits:#?}");

    let hits = find_lines_containing("src/adapter/outbound/provider", &["diesel"]);
    assert!(hits.is_empty(), "diesel used by provider adapters: {hits:#?}");
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}

#[test]
fn operator_port_is_transport_agnostic() {
    let hits = find_lines_containing("src/port/inbound", &["std::path::Path", "PathBuf", "clap"]);
    assert!(
        hits.is_empty(),
        "operator inbound port should not expose CLI or filesystem types: {hits:#?}"
    );
}

#[test]
fn cli_operator_bridge_uses_operator_name() {
    let source = read_relative("src/adapter/inbound/cli/operator.rs");
    assert!(
        source.contains("pub fn operator() -> Result<&'static dyn RegimeOperator>"),
        "operator bridge should expose `operator()` capability accessor"
    );
}

#[test]
fn migrations_are_embedded_from_the_crate_root() {
    assert!(path_exists("migrations"));
    let source = read_relative("src/adapter/outbound/sqlite/database/connection.rs");
    assert!(source.contains("embed_migrations!"));
}
