//! Tests for tool registration, middleware and concurrent dispatch.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::call;
use curia::agent::{AgentEventKind, AgentEvents};
use curia::error::CuriaError;
use curia::tools::{
    dispatch_tool_calls, execute_tool_call, NativeTool, Next, Tool, ToolArguments, ToolContext,
    ToolMiddleware, ToolParameters, ToolRegistry, ValidateArguments,
};

fn sleepy_tool(name: &str, delay_ms: u64) -> Arc<dyn Tool> {
    let label = name.to_string();
    Arc::new(NativeTool::new(
        name,
        "Sleeps, then echoes its name",
        ToolParameters::empty(),
        move |_args, _ctx| {
            let label = label.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(json!(label))
            }
        },
    ))
}

#[tokio::test(start_paused = true)]
async fn results_keep_request_order_regardless_of_latency() {
    let delays = [37u64, 5, 48, 12, 1, 29, 44, 3];
    let tools = delays
        .iter()
        .enumerate()
        .map(|(i, delay)| sleepy_tool(&format!("tool_{i}"), *delay))
        .collect();
    let registry = ToolRegistry::new(tools).unwrap();
    let calls: Vec<_> = (0..delays.len())
        .map(|i| call(&format!("call-{i}"), &format!("tool_{i}"), json!({})))
        .collect();

    let outcomes = dispatch_tool_calls(
        &registry,
        &calls,
        &ToolContext::default(),
        &AgentEvents::new(),
    )
    .await;

    let ids: Vec<_> = outcomes
        .iter()
        .map(|o| o.message.tool_call_id.clone().unwrap())
        .collect();
    let expected: Vec<_> = (0..delays.len()).map(|i| format!("call-{i}")).collect();
    assert_eq!(ids, expected);
    assert!(outcomes.iter().all(|o| o.succeeded));
    assert_eq!(outcomes[2].message.content, "tool_2");
}

#[tokio::test(start_paused = true)]
async fn calls_run_concurrently() {
    let registry = ToolRegistry::new(vec![sleepy_tool("a", 100), sleepy_tool("b", 100)]).unwrap();
    let calls = vec![call("1", "a", json!({})), call("2", "b", json!({}))];
    let started = tokio::time::Instant::now();

    dispatch_tool_calls(&registry, &calls, &ToolContext::default(), &AgentEvents::new()).await;

    assert!(started.elapsed() < Duration::from_millis(150));
}

#[tokio::test(start_paused = true)]
async fn timeouts_become_error_messages() {
    let tool = NativeTool::new("slow", "Too slow", ToolParameters::empty(), |_args, _ctx| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(json!("late"))
    })
    .with_timeout(Duration::from_millis(50));
    let registry = ToolRegistry::new(vec![Arc::new(tool) as Arc<dyn Tool>]).unwrap();

    let outcome = execute_tool_call(
        &registry,
        &call("1", "slow", json!({})),
        &ToolContext::default(),
        &AgentEvents::new(),
    )
    .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.message.content, "Error: Timeout after 50ms");
}

struct Scale(f64);

#[async_trait]
impl ToolMiddleware for Scale {
    async fn handle(
        &self,
        mut args: ToolArguments,
        _ctx: &ToolContext,
        next: Next<'_>,
    ) -> Result<Value, CuriaError> {
        let x = args.get_f64("x")?;
        args.set("x", json!(x * self.0));
        next.run(args).await
    }
}

struct Record(&'static str, Arc<Mutex<Vec<&'static str>>>);

#[async_trait]
impl ToolMiddleware for Record {
    async fn handle(
        &self,
        args: ToolArguments,
        _ctx: &ToolContext,
        next: Next<'_>,
    ) -> Result<Value, CuriaError> {
        self.1.lock().unwrap().push(self.0);
        next.run(args).await
    }
}

#[tokio::test]
async fn middleware_transforms_arguments_outermost_first() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let tool = NativeTool::new(
        "echo_x",
        "Echo x",
        ToolParameters::object().number("x", "Value", true).build(),
        |args, _ctx| async move { Ok(json!(args.get_f64("x")?)) },
    )
    .with_middleware(Record("outer", order.clone()))
    .with_middleware(Scale(10.0))
    .with_middleware(Record("inner", order.clone()));
    let registry = ToolRegistry::new(vec![Arc::new(tool) as Arc<dyn Tool>]).unwrap();

    let outcome = execute_tool_call(
        &registry,
        &call("1", "echo_x", json!({ "x": 2 })),
        &ToolContext::default(),
        &AgentEvents::new(),
    )
    .await;

    assert_eq!(outcome.message.content, "20.0");
    assert_eq!(*order.lock().unwrap(), vec!["outer", "inner"]);
}

#[tokio::test]
async fn middleware_failures_count_as_tool_failures() {
    let tool = NativeTool::new(
        "echo_x",
        "Echo x",
        ToolParameters::empty(),
        |_args, _ctx| async { Ok(json!("unreachable")) },
    )
    .with_middleware(Scale(2.0));
    let registry = ToolRegistry::new(vec![Arc::new(tool) as Arc<dyn Tool>]).unwrap();

    let outcome = execute_tool_call(
        &registry,
        &call("1", "echo_x", json!({})),
        &ToolContext::default(),
        &AgentEvents::new(),
    )
    .await;

    assert!(!outcome.succeeded);
    assert_eq!(
        outcome.message.content,
        "Error: Invalid argument: Missing number argument: x"
    );
}

#[tokio::test]
async fn malformed_arguments_are_treated_as_empty() {
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let tool = NativeTool::new("inspect", "Inspect", ToolParameters::empty(), move |args, _ctx| {
        let sink = sink.clone();
        async move {
            *sink.lock().unwrap() = Some(args.into_value());
            Ok(json!("ok"))
        }
    });
    let registry = ToolRegistry::new(vec![Arc::new(tool) as Arc<dyn Tool>]).unwrap();
    let broken = curia::types::ToolCall::new("1", "inspect", "{not json");

    let outcome =
        execute_tool_call(&registry, &broken, &ToolContext::default(), &AgentEvents::new()).await;

    assert!(outcome.succeeded);
    assert_eq!(*seen.lock().unwrap(), Some(json!({})));
}

#[tokio::test]
async fn malformed_arguments_still_reach_tools_with_required_parameters() {
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let counter = handler_calls.clone();
    let tool = NativeTool::new(
        "search",
        "Search the web",
        ToolParameters::object().string("q", "Query", true).build(),
        move |args, _ctx| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!(args.get_str_opt("q").unwrap_or("everything")))
            }
        },
    );
    let registry = ToolRegistry::new(vec![Arc::new(tool) as Arc<dyn Tool>]).unwrap();
    let broken = curia::types::ToolCall::new("1", "search", "{oops");

    let outcome =
        execute_tool_call(&registry, &broken, &ToolContext::default(), &AgentEvents::new()).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.message.content, "everything");
    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn argument_validation_is_opt_in_middleware() {
    let tool = NativeTool::new(
        "search",
        "Search the web",
        ToolParameters::object().string("q", "Query", true).build(),
        |args, _ctx| async move { Ok(json!(args.get_str("q")?)) },
    )
    .with_middleware(ValidateArguments);
    let registry = ToolRegistry::new(vec![Arc::new(tool) as Arc<dyn Tool>]).unwrap();

    let outcome = execute_tool_call(
        &registry,
        &call("1", "search", json!({})),
        &ToolContext::default(),
        &AgentEvents::new(),
    )
    .await;

    assert!(!outcome.succeeded);
    assert_eq!(
        outcome.message.content,
        "Error: Invalid argument: missing required field 'q'"
    );
}

#[tokio::test]
async fn context_reaches_the_handler() {
    let tool = NativeTool::new("whoami", "Report caller", ToolParameters::empty(), |_args, ctx| async move {
        Ok(json!({
            "agent": ctx.agent,
            "user": ctx.context["user"],
            "call": ctx.tool_call_id,
        }))
    });
    let registry = ToolRegistry::new(vec![Arc::new(tool) as Arc<dyn Tool>]).unwrap();
    let ctx = ToolContext::new("Boss", json!({ "user": 7 }), Default::default());

    let outcome =
        execute_tool_call(&registry, &call("c9", "whoami", json!({})), &ctx, &AgentEvents::new())
            .await;

    let value: Value = serde_json::from_str(&outcome.message.content).unwrap();
    assert_eq!(value, json!({ "agent": "Boss", "user": 7, "call": "c9" }));
}

#[tokio::test]
async fn lifecycle_events_are_emitted_per_call() {
    let events = AgentEvents::new();
    let starts = Arc::new(AtomicUsize::new(0));
    let ends = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    for (kind, counter) in [
        (AgentEventKind::ToolCallStart, starts.clone()),
        (AgentEventKind::ToolCallEnd, ends.clone()),
        (AgentEventKind::ToolCallError, errors.clone()),
    ] {
        events.on(kind, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    let failing = NativeTool::new("fail", "Always fails", ToolParameters::empty(), |_args, _ctx| async {
        Err(CuriaError::tool("fail", "nope"))
    });
    let registry =
        ToolRegistry::new(vec![sleepy_tool("ok", 0), Arc::new(failing) as Arc<dyn Tool>]).unwrap();
    let calls = vec![call("1", "ok", json!({})), call("2", "fail", json!({}))];

    let outcomes = dispatch_tool_calls(&registry, &calls, &ToolContext::default(), &events).await;

    assert_eq!(outcomes[1].message.content, "Error: Tool execution error: fail: nope");
    assert_eq!(starts.load(Ordering::SeqCst), 2);
    assert_eq!(ends.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[test]
fn registration_rejects_duplicate_names() {
    let result = ToolRegistry::new(vec![sleepy_tool("Same Name", 0), sleepy_tool("same name", 0)]);
    assert!(matches!(result, Err(CuriaError::DuplicateTool(name)) if name == "same_name"));
}
