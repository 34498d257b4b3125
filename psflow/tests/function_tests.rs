use psflow::prelude::*;

fn output_of(function: &mut Function) -> bool {
    function
        .invoke_as::<bool>()
        .expect("function should invoke successfully")
}

fn value_of(function: &Function, name: &str) -> Result<Value> {
    function
        .variables()
        .by_name(name)
        .expect("variable should be declared")
        .get()
}

#[test]
fn later_write_wins() {
    let mut function = Function::builder("order")
        .variable("x", false)
        .step(Step::set("x", true))
        .step(Step::set("x", false))
        .output("x")
        .build()
        .expect("function should build");

    assert!(!output_of(&mut function), "steps must run in declaration order");
}

#[test]
fn boolean_operators_follow_truth_tables() {
    for (left, right) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut and = Function::builder("and")
            .variable("l", left)
            .variable("r", right)
            .placeholder("t", ValueKind::Bool)
            .step(Step::and("t", "l", "r"))
            .output("t")
            .build()
            .expect("function should build");
        assert_eq!(output_of(&mut and), left && right, "{left} && {right}");

        let mut or = Function::builder("or")
            .variable("l", left)
            .variable("r", right)
            .placeholder("t", ValueKind::Bool)
            .step(Step::or("t", "l", "r"))
            .output("t")
            .build()
            .expect("function should build");
        assert_eq!(output_of(&mut or), left || right, "{left} || {right}");
    }
}

#[test]
fn double_flip_restores_value() {
    for initial in [false, true] {
        let mut function = Function::builder("double flip")
            .variable("x", initial)
            .step(Step::flip("x"))
            .step(Step::flip("x"))
            .output("x")
            .build()
            .expect("function should build");
        assert_eq!(output_of(&mut function), initial);
    }
}

#[test]
fn flip_writes_negation_into_destination() {
    let mut function = Function::builder("negate")
        .variable("s", true)
        .variable("d", true)
        .step(Step::negate("s", "d"))
        .output("d")
        .build()
        .expect("function should build");

    assert!(!output_of(&mut function));
    assert_eq!(value_of(&function, "s"), Ok(Value::Bool(true)));
}

fn conditional(condition: Option<bool>, config: EngineConfig) -> Function {
    let mut builder = Function::builder("conditional")
        .config(config)
        .variable("x", true)
        .step(Step::branch(
            "cond",
            [Step::set("x", true)],
            [Step::set("x", false)],
        ))
        .output("x");
    if let Some(condition) = condition {
        builder = builder.variable("cond", condition);
    }
    builder.build().expect("function should build")
}

#[test]
fn if_runs_selected_branch() {
    let mut function = conditional(Some(true), EngineConfig::default());
    assert!(output_of(&mut function));

    let mut function = conditional(Some(false), EngineConfig::default());
    assert!(!output_of(&mut function));
}

#[test]
fn if_with_unresolved_condition_fails_by_default() {
    let mut function = conditional(None, EngineConfig::default());
    let err = function.invoke().unwrap_err();

    assert_eq!(
        err,
        Error::UnresolvedName {
            name: "cond".to_string(),
            context: "step `if cond { x = true; } else { x = false; }`".to_string(),
        }
    );
    assert_eq!(value_of(&function, "x"), Ok(Value::Bool(true)));
}

#[test]
fn if_with_unresolved_condition_can_be_skipped() {
    let config = EngineConfig {
        missing_condition: ConditionPolicy::Skip,
        ..EngineConfig::default()
    };
    let mut function = Function::builder("skipped")
        .config(config)
        .variable("x", false)
        .step(Step::branch(
            "cond",
            [Step::set("x", true)],
            [Step::set("x", true)],
        ))
        .output("x")
        .build()
        .expect("function should build");

    assert!(!output_of(&mut function), "neither branch may run");
}

#[test]
fn sharks_in_water_scenario() {
    let mut function = Function::from_lines(
        "sharks",
        [
            def("sharksInWater").equal(false).into(),
            Step::flip("sharksInWater").into(),
            ret("sharksInWater").into(),
        ],
    )
    .expect("function should build");

    assert_eq!(function.invoke(), Ok(Value::Bool(true)));
}

#[test]
fn going_to_the_beach_scenario() {
    let mut function = Function::from_lines(
        "beach",
        [
            def("wavesAreHigh").equal(false).into(),
            def("sharksInWater").equal(true).into(),
            def("beachIsOpen").equal(false).into(),
            def("goingToTheBeach").of_kind(ValueKind::Bool).into(),
            Step::and("beachIsOpen", "sharksInWater", "wavesAreHigh").into(),
            Step::branch(
                "beachIsOpen",
                [Step::set("goingToTheBeach", true)],
                [Step::set("goingToTheBeach", false)],
            )
            .into(),
            ret("goingToTheBeach").into(),
        ],
    )
    .expect("function should build");

    assert_eq!(function.invoke(), Ok(Value::Bool(false)));
    assert_eq!(value_of(&function, "beachIsOpen"), Ok(Value::Bool(false)));
}

#[test]
fn undeclared_output_is_unresolved() {
    let mut function = Function::builder("ghost")
        .variable("x", true)
        .output("y")
        .build()
        .expect("a missing output variable is only detected on invoke");

    assert_eq!(
        function.invoke(),
        Err(Error::UnresolvedName {
            name: "y".to_string(),
            context: "output".to_string(),
        })
    );
}

#[test]
fn uninitialized_output_is_reported() {
    let mut function = Function::builder("pending")
        .placeholder("x", ValueKind::Bool)
        .output("x")
        .build()
        .expect("function should build");

    assert!(function.invoke().unwrap_err().is_uninitialized_value());
}

#[test]
fn failed_invocation_restores_variables() {
    let mut function = Function::builder("rollback")
        .variable("x", false)
        .placeholder("pending", ValueKind::Bool)
        .step(Step::flip("x"))
        .step(Step::copy("x", "pending"))
        .output("x")
        .build()
        .expect("function should build");

    let err = function.invoke().unwrap_err();
    assert_eq!(
        err,
        Error::StepFailed {
            step: "x = pending".to_string(),
            source: Box::new(Error::UninitializedValue {
                name: "pending".to_string()
            }),
        }
    );
    assert_eq!(
        value_of(&function, "x"),
        Ok(Value::Bool(false)),
        "the flip must be undone"
    );
}

#[test]
fn read_failures_name_the_step() {
    let mut function = Function::builder("unwired")
        .placeholder("l", ValueKind::Bool)
        .variable("r", true)
        .placeholder("t", ValueKind::Bool)
        .step(Step::and("t", "l", "r"))
        .output("t")
        .build()
        .expect("function should build");

    let err = function.invoke().unwrap_err();
    assert!(
        err.to_string().contains("t = l && r"),
        "error should name the failing step: {err}"
    );
    assert_eq!(
        err.root_cause(),
        &Error::UninitializedValue {
            name: "l".to_string()
        }
    );
}

#[test]
fn verify_rejects_undeclared_step_variables() {
    let function = Function::builder("typo")
        .variable("x", false)
        .step(Step::when("x", [Step::set("y", true)]))
        .output("x")
        .build()
        .expect("function should build");

    assert_eq!(
        function.verify(),
        Err(Error::UnresolvedName {
            name: "y".to_string(),
            context: "step `y = true`".to_string(),
        })
    );
}

#[test]
fn state_persists_between_invocations() {
    let mut function = Function::builder("toggle")
        .variable("lamp", false)
        .step(Step::flip("lamp"))
        .output("lamp")
        .build()
        .expect("function should build");

    assert!(output_of(&mut function));
    assert!(!output_of(&mut function));

    function
        .reset_variables()
        .expect("reset should succeed");
    assert_eq!(value_of(&function, "lamp"), Ok(Value::Bool(false)));
}

#[test]
fn connected_variables_mirror_their_leader() {
    let mut function = Function::builder("wired")
        .variable("switch", false)
        .placeholder("lamp", ValueKind::Bool)
        .step(Step::set("switch", true))
        .output("lamp")
        .build()
        .expect("function should build");
    function
        .connect("lamp", "switch")
        .expect("connection should be accepted");

    assert!(output_of(&mut function));

    function.disconnect("lamp").expect("lamp should exist");
    function
        .add_line(Step::set("switch", false))
        .expect("step should be appended");
    assert!(output_of(&mut function), "a disconnected lamp keeps its value");
}

#[test]
fn add_lines_extends_a_built_function() {
    let mut function = Function::builder("growing")
        .variable("a", true)
        .output("a")
        .build()
        .expect("function should build");

    function
        .add_lines([
            def("b").equal(false).into(),
            Step::copy("b", "a").into(),
            ret("b").into(),
        ])
        .expect("lines should be added");

    assert_eq!(function.output_name(), "b");
    assert!(output_of(&mut function));
}

fn sharks_in_water() -> Function {
    Function::builder("sharksInWater")
        .variable("sharksInWater", false)
        .step(Step::flip("sharksInWater"))
        .output("sharksInWater")
        .build()
        .expect("inner function should build")
}

#[test]
fn embedded_function_supplies_a_variable() {
    let mut function = Function::builder("goingToBeach")
        .function(sharks_in_water())
        .variable("wavesAreHigh", false)
        .variable("beachIsOpen", true)
        .variable("goingToTheBeach", true)
        .step(Step::and("beachIsOpen", "sharksInWater", "wavesAreHigh"))
        .step(Step::branch(
            "beachIsOpen",
            [Step::set("goingToTheBeach", true)],
            [Step::set("goingToTheBeach", false)],
        ))
        .output("goingToTheBeach")
        .build()
        .expect("function should build");

    assert!(!output_of(&mut function));
    assert_eq!(value_of(&function, "sharksInWater"), Ok(Value::Bool(true)));

    // The embedded function keeps its own state and runs again on every call.
    output_of(&mut function);
    assert_eq!(value_of(&function, "sharksInWater"), Ok(Value::Bool(false)));
}

#[test]
fn failed_invocation_restores_embedded_functions() {
    let mut function = Function::builder("broken")
        .function(sharks_in_water())
        .placeholder("pending", ValueKind::Bool)
        .step(Step::copy("sharksInWater", "pending"))
        .output("sharksInWater")
        .build()
        .expect("function should build");

    assert!(function.invoke().is_err());
    let inner = &function.subfunctions()[0];
    assert_eq!(
        inner
            .variables()
            .by_name("sharksInWater")
            .expect("inner variable should be declared")
            .get(),
        Ok(Value::Bool(false)),
        "the embedded flip must be undone"
    );
}
