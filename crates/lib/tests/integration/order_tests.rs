use pkgsched_lib::Error;
use pkgsched_lib::context::{Phase, StateError};
use pkgsched_lib::declare::RuleDecl;
use pkgsched_lib::order::{BuildOrderError, Variant};

use super::common::{context, pkg, rule_label};

fn variants(names: &[&str]) -> Vec<Variant> {
  names.iter().map(|name| Variant::from(*name)).collect()
}

#[test]
fn host_variant_builds_before_dependent_target_variant() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.declare(RuleDecl::program("host_tool").srcs("tool.c"), &pkg("tools")).unwrap();
  ctx
    .declare(
      RuleDecl::program("target").srcs("main.c").deps("#tools:host_tool").variant("arm"),
      &pkg("firmware"),
    )
    .unwrap();

  for requested in [["host", "arm"], ["arm", "host"]] {
    let order = ctx.compute_build_order(&variants(&requested)).unwrap();

    let in_order: Vec<_> = order.variants_in_order().map(Variant::as_str).collect();
    assert_eq!(in_order, ["host", "arm"], "requested {:?}", requested);
    assert_eq!(order.rules_for(&"host".into()), &[rule_label("#tools:host_tool")]);
    assert_eq!(order.rules_for(&"arm".into()), &[rule_label("#firmware:target")]);
  }
}

#[test]
fn library_builds_before_program() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.declare(RuleDecl::library("lib").srcs("lib.c"), &pkg("p")).unwrap();
  ctx.declare(RuleDecl::program("app").srcs("main.c").deps(":lib"), &pkg("p")).unwrap();

  let order = ctx.compute_build_order(&variants(&["host"])).unwrap();

  assert_eq!(order.variants_in_order().collect::<Vec<_>>(), vec![&Variant::from("host")]);
  assert_eq!(order.rules_for(&"host".into()), &[rule_label("#p:lib"), rule_label("#p:app")]);
}

#[test]
fn package_variants_are_inherited() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.set_package_variant(&pkg("board"), "arm").unwrap();
  ctx.set_package_variant(&pkg("board/sim"), "host").unwrap();
  ctx.declare(RuleDecl::library("hal"), &pkg("board/drivers")).unwrap();
  ctx.declare(RuleDecl::program("sim").deps("#util:fmt"), &pkg("board/sim")).unwrap();
  ctx.declare(RuleDecl::library("fmt"), &pkg("util")).unwrap();
  ctx.declare(RuleDecl::program("fw").deps("#board/drivers:hal #util:fmt"), &pkg("board")).unwrap();

  let order = ctx.compute_build_order(&variants(&["arm", "host"])).unwrap();

  let in_order: Vec<_> = order.variants_in_order().map(Variant::as_str).collect();
  assert_eq!(in_order, ["host", "arm"]);
  assert_eq!(
    order.rules_for(&"host".into()),
    &[rule_label("#util:fmt"), rule_label("#board/sim:sim")]
  );
  assert_eq!(
    order.rules_for(&"arm".into()),
    &[rule_label("#board/drivers:hal"), rule_label("#board:fw")]
  );
}

#[test]
fn missing_dependency_reports_one_pair() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.declare(RuleDecl::program("a").deps("b"), &pkg("p")).unwrap();

  let err = ctx.compute_build_order(&variants(&["host"])).unwrap_err();
  let Error::BuildOrder(BuildOrderError::MissingDependencies(report)) = &err else {
    panic!("expected missing dependencies, got {err:?}");
  };

  assert_eq!(report.len(), 1);
  assert_eq!(report.entries()[0].rule, rule_label("#p:a"));
  assert_eq!(report.entries()[0].missing, rule_label("#p:b"));
  assert_eq!(report.entries()[0].candidates, vec![rule_label("#p:a")]);
  assert!(err.to_string().contains("#p:a depends on non-existing #p:b"));
}

#[test]
fn mutual_variant_dependencies_are_a_cycle() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.set_package_variant(&pkg("arm"), "arm").unwrap();
  ctx.declare(RuleDecl::library("a"), &pkg("host")).unwrap();
  ctx.declare(RuleDecl::library("b").deps("#host:a"), &pkg("arm")).unwrap();
  ctx.declare(RuleDecl::library("c"), &pkg("arm")).unwrap();
  ctx.declare(RuleDecl::library("d").deps("#arm:c"), &pkg("host")).unwrap();

  let err = ctx.compute_build_order(&variants(&["host", "arm"])).unwrap_err();
  assert!(matches!(err, Error::BuildOrder(BuildOrderError::VariantCycle(_))));
}

#[test]
fn rule_cycle_is_reported() {
  let mut ctx = context();
  ctx.declare(RuleDecl::library("a").deps("b"), &pkg("p")).unwrap();
  ctx.declare(RuleDecl::library("b").deps("a"), &pkg("p")).unwrap();

  let err = ctx.compute_unvaried_order().unwrap_err();
  let Error::BuildOrder(BuildOrderError::RuleCycle(cycle)) = &err else {
    panic!("expected rule cycle, got {err:?}");
  };
  assert_eq!(cycle.members(), &[rule_label("#p:a"), rule_label("#p:b")]);
}

#[test]
fn declarations_are_rejected_once_scheduling_starts() {
  let mut ctx = context();
  ctx.set_default_variant("host").unwrap();
  ctx.declare(RuleDecl::program("app"), &pkg("p")).unwrap();
  ctx.compute_build_order(&variants(&["host"])).unwrap();

  let err = ctx.declare(RuleDecl::program("late"), &pkg("p")).unwrap_err();
  assert!(matches!(
    err,
    Error::State(StateError {
      phase: Phase::Scheduling,
      ..
    })
  ));
  assert!(ctx.set_default_variant("arm").is_err());
  assert!(ctx.set_root_environment(super::common::Toolchain::new("clang")).is_err());
  assert_eq!(ctx.rules().len(), 1);
}

#[test]
fn identical_declarations_give_identical_plans() {
  let plan = || {
    let mut ctx = context();
    ctx.set_default_variant("host").unwrap();
    for (name, deps) in [("z", ""), ("y", "z"), ("x", "z"), ("w", "x y")] {
      ctx.declare(RuleDecl::library(name).deps(deps), &pkg("p")).unwrap();
    }
    let order = ctx.compute_build_order(&variants(&["host"])).unwrap();
    serde_json::to_string(&order).unwrap()
  };

  assert_eq!(plan(), plan());
  assert_eq!(plan(), r##"{"host":["#p:z","#p:y","#p:x","#p:w"]}"##);
}
