use pkgsched_lib::Error;
use pkgsched_lib::declare::RuleDecl;
use pkgsched_lib::manifest::BuildManifest;
use pkgsched_lib::order::Variant;

use super::common::{context, invoked_rules, pkg, recording_dispatcher};

const MANIFEST: &str = r##"{
  "default_variant": "host",
  "variants": ["arm", "host"],
  "packages": {
    "firmware": { "variant": "arm" }
  },
  "rules": [
    { "package": "firmware", "kind": "program", "name": "image", "srcs": ["main.c"], "deps": ["hal", "#tools:gen"] },
    { "package": "firmware", "kind": "static_library", "name": "hal", "srcs": ["hal.c"] },
    { "package": "tools", "kind": "program", "name": "gen", "srcs": ["gen.c"] },
    { "package": "tools", "kind": "program", "name": "flash", "deps": ["#firmware:image"], "variant": "arm" }
  ]
}"##;

#[test]
fn manifest_matches_equivalent_declarations() {
  let manifest = BuildManifest::from_json(MANIFEST).unwrap();
  let mut from_manifest = context();
  manifest.apply(&mut from_manifest).unwrap();
  let manifest_order = from_manifest.compute_build_order(&manifest.variants).unwrap();

  let mut declared = context();
  declared.set_default_variant("host").unwrap();
  declared.set_package_variant(&pkg("firmware"), "arm").unwrap();
  declared
    .declare(
      RuleDecl::program("image").srcs("main.c").deps("hal #tools:gen"),
      &pkg("firmware"),
    )
    .unwrap();
  declared.declare(RuleDecl::library("hal").srcs("hal.c"), &pkg("firmware")).unwrap();
  declared.declare(RuleDecl::program("gen").srcs("gen.c"), &pkg("tools")).unwrap();
  declared
    .declare(RuleDecl::program("flash").deps("#firmware:image").variant("arm"), &pkg("tools"))
    .unwrap();
  let declared_order = declared
    .compute_build_order(&[Variant::from("arm"), Variant::from("host")])
    .unwrap();

  assert_eq!(manifest_order, declared_order);
  assert_eq!(
    serde_json::to_value(&manifest_order).unwrap(),
    serde_json::json!({
      "host": ["#tools:gen"],
      "arm": ["#firmware:hal", "#firmware:image", "#tools:flash"],
    })
  );
}

#[test]
fn manifest_build_runs_end_to_end() {
  let manifest = BuildManifest::from_json(MANIFEST).unwrap();
  let mut ctx = context();
  manifest.apply(&mut ctx).unwrap();
  let order = ctx.compute_build_order(&manifest.variants).unwrap();

  let (mut dispatcher, invocations) = recording_dispatcher();
  dispatcher.dispatch(&mut ctx, &order).unwrap();

  assert_eq!(
    invoked_rules(&invocations),
    ["#tools:gen", "#firmware:hal", "#firmware:image", "#tools:flash"]
  );
}

#[test]
fn undeclared_dependency_in_manifest() {
  let json = r##"{
    "default_variant": "host",
    "rules": [{ "package": "p", "kind": "program", "name": "app", "deps": ["#q:missing"] }]
  }"##;
  let manifest = BuildManifest::from_json(json).unwrap();
  let mut ctx = context();
  manifest.apply(&mut ctx).unwrap();

  let err = ctx.compute_build_order(&[Variant::from("host")]).unwrap_err();
  assert!(matches!(err, Error::BuildOrder(_)));
  assert!(err.to_string().contains("#p:app depends on non-existing #q:missing"));
}
