use std::path::PathBuf;

use pkgsched_lib::Error;
use pkgsched_lib::context::Phase;
use pkgsched_lib::declare::RuleDecl;
use pkgsched_lib::dispatch::DispatchError;
use pkgsched_lib::order::Variant;

use super::common::{Toolchain, context, invoked_rules, pkg, recording_dispatcher, rule_label};

#[test]
fn library_output_feeds_program() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.declare(RuleDecl::library("lib").srcs("lib.c"), &pkg("p")).unwrap();
  ctx.declare(RuleDecl::program("app").srcs("main.c").deps("lib"), &pkg("p")).unwrap();
  let order = ctx.compute_build_order(&[Variant::from("host")]).unwrap();

  let (mut dispatcher, invocations) = recording_dispatcher();
  let report = dispatcher.dispatch(&mut ctx, &order).unwrap();

  assert_eq!(invoked_rules(&invocations), ["#p:lib", "#p:app"]);
  let invocations = invocations.borrow();
  assert_eq!(invocations[0].target, PathBuf::from("p/lib"));
  assert_eq!(invocations[1].target, PathBuf::from("p/app"));
  assert_eq!(
    invocations[1].sources,
    vec![PathBuf::from("p/main.c"), PathBuf::from("p/liblib.a")]
  );

  assert_eq!(report.len(), 2);
  assert_eq!(report.outputs_of(&rule_label("#p:lib")), Some(&[PathBuf::from("p/liblib.a")][..]));
  assert_eq!(ctx.phase(), Phase::Execution);
}

#[test]
fn variants_are_built_in_order() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.set_package_variant(&pkg("firmware"), "arm").unwrap();
  ctx.declare(RuleDecl::program("image").deps("#tools:gen"), &pkg("firmware")).unwrap();
  ctx.declare(RuleDecl::program("gen").srcs("gen.c"), &pkg("tools")).unwrap();
  let order = ctx.compute_build_order(&[Variant::from("arm"), Variant::from("host")]).unwrap();

  let (mut dispatcher, invocations) = recording_dispatcher();
  let report = dispatcher.dispatch(&mut ctx, &order).unwrap();

  assert_eq!(invoked_rules(&invocations), ["#tools:gen", "#firmware:image"]);
  let variants: Vec<_> = report.built().iter().map(|built| built.variant.as_str()).collect();
  assert_eq!(variants, ["host", "arm"]);
  assert_eq!(invocations.borrow()[1].sources, vec![PathBuf::from("tools/gen")]);
}

#[test]
fn exported_environment_reaches_direct_dependents() {
  let mut ctx = context();
  ctx
    .declare(
      RuleDecl::library("zlib")
        .srcs("inflate.c")
        .export_env(|env: &mut Toolchain| env.flags.push("-Izlib/include".to_string())),
      &pkg("zlib"),
    )
    .unwrap();
  ctx.declare(RuleDecl::library("png").deps("#zlib:zlib"), &pkg("png")).unwrap();
  ctx.declare(RuleDecl::program("viewer").deps("#png:png"), &pkg("viewer")).unwrap();
  let order = ctx.compute_unvaried_order().unwrap();

  let (mut dispatcher, invocations) = recording_dispatcher();
  dispatcher.dispatch(&mut ctx, &order).unwrap();

  let invocations = invocations.borrow();
  assert!(invocations[0].toolchain.flags.is_empty());
  assert_eq!(invocations[1].toolchain.flags, ["-Izlib/include"]);
  assert!(invocations[2].toolchain.flags.is_empty());
  assert!(ctx.package_environments().default_value().unwrap().flags.is_empty());
}

#[test]
fn environments_resolve_by_rule_then_package_then_root() {
  let mut ctx = context();
  ctx.set_package_environment(&pkg("third_party"), Toolchain::new("gcc")).unwrap();
  ctx.declare(RuleDecl::library("a"), &pkg("third_party/a")).unwrap();
  ctx
    .declare(RuleDecl::library("b").env(Toolchain::new("clang")), &pkg("third_party/b"))
    .unwrap();
  ctx.declare(RuleDecl::program("c"), &pkg("app")).unwrap();
  let order = ctx.compute_unvaried_order().unwrap();

  let (mut dispatcher, invocations) = recording_dispatcher();
  dispatcher.dispatch(&mut ctx, &order).unwrap();

  let names: Vec<_> = invocations.borrow().iter().map(|inv| inv.toolchain.name.clone()).collect();
  assert_eq!(names, ["gcc", "clang", "cc"]);
}

#[test]
fn dispatch_requires_scheduling() {
  let mut ctx = context();
  ctx.declare(RuleDecl::program("app"), &pkg("p")).unwrap();
  let order = ctx.compute_unvaried_order().unwrap();

  let (mut dispatcher, _) = recording_dispatcher();
  dispatcher.dispatch(&mut ctx, &order).unwrap();

  let err = dispatcher.dispatch(&mut ctx, &order).unwrap_err();
  assert!(matches!(err, Error::State(_)));
}

#[test]
fn handler_error_stops_the_pass() {
  let mut ctx = context();
  ctx.declare(RuleDecl::library("a"), &pkg("p")).unwrap();
  ctx.declare(RuleDecl::program("b").deps("a"), &pkg("p")).unwrap();
  let order = ctx.compute_unvaried_order().unwrap();

  let (mut dispatcher, invocations) = recording_dispatcher();
  dispatcher.register(pkgsched_lib::dispatch::BuilderKind::StaticLibrary, |_| {
    Err("archiver missing".into())
  });

  let err = dispatcher.dispatch(&mut ctx, &order).unwrap_err();
  assert!(matches!(err, Error::Dispatch(DispatchError::Handler { .. })));
  assert!(invocations.borrow().is_empty());
  assert_eq!(ctx.rule_outputs(&rule_label("#p:a")), None);
}
