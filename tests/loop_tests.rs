//! Tests for the per-resource extraction loop.

mod common;

use std::sync::{Arc, Mutex};

use common::{invoker, resource, rows, wrap, ScriptedAgent};
use kbharvest::agent_loop::{ExtractionLoop, TurnEvent, DEFAULT_MAX_TURNS};
use kbharvest::error::HarvestError;
use kbharvest::stop::{PredicateTermination, StopReason};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn rows_accumulate_in_order_until_empty() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .reply(rows(0, 2))
            .reply(rows(2, 3))
            .reply(wrap("[]")),
    );
    let report = ExtractionLoop::new(invoker(&agent))
        .run(&resource("r1"))
        .await
        .unwrap();

    let texts: Vec<_> = report
        .observations
        .iter()
        .map(|o| o.observation_text.clone().unwrap())
        .collect();
    assert_eq!(
        texts,
        vec!["finding 0", "finding 1", "finding 2", "finding 3", "finding 4"]
    );
    assert_eq!(report.turns, 3);
    assert_eq!(report.stop_reason, StopReason::AgentExhausted);
    assert_eq!(agent.call_count(), 3);
}

#[tokio::test]
async fn empty_first_turn_ends_the_run() {
    let agent = Arc::new(ScriptedAgent::new().reply(wrap("null")).reply(rows(0, 1)));
    let report = ExtractionLoop::new(invoker(&agent))
        .run(&resource("r1"))
        .await
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.turns, 1);
    assert_eq!(agent.call_count(), 1);
}

#[tokio::test]
async fn malformed_first_turn_ends_the_run() {
    let agent = Arc::new(ScriptedAgent::new().reply("Sorry, I can't help with that."));
    let report = ExtractionLoop::new(invoker(&agent))
        .run(&resource("r1"))
        .await
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.stop_reason, StopReason::MalformedReply);
    assert_eq!(agent.call_count(), 1);
}

#[tokio::test]
async fn malformed_later_turn_keeps_earlier_rows() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .reply(rows(0, 2))
            .reply(wrap("{not valid}")),
    );
    let report = ExtractionLoop::new(invoker(&agent))
        .run(&resource("r1"))
        .await
        .unwrap();

    assert_eq!(report.observations.len(), 2);
    assert_eq!(report.stop_reason, StopReason::MalformedReply);
}

#[tokio::test]
async fn ceiling_stops_an_agent_that_never_runs_dry() {
    let agent = Arc::new(ScriptedAgent::new().with_fallback(rows(0, 1)));
    let report = ExtractionLoop::new(invoker(&agent))
        .run(&resource("r1"))
        .await
        .unwrap();

    assert_eq!(agent.call_count(), DEFAULT_MAX_TURNS);
    assert_eq!(report.turns, 100);
    assert_eq!(report.observations.len(), 100);
    assert_eq!(report.stop_reason, StopReason::TurnCeiling);
}

#[tokio::test]
async fn custom_ceiling_is_honored() {
    let agent = Arc::new(ScriptedAgent::new().with_fallback(rows(0, 1)));
    let report = ExtractionLoop::new(invoker(&agent))
        .with_max_turns(3)
        .run(&resource("r1"))
        .await
        .unwrap();
    assert_eq!(report.turns, 3);
    assert_eq!(agent.call_count(), 3);
}

#[tokio::test]
async fn zero_ceiling_is_rejected_before_any_call() {
    let agent = Arc::new(ScriptedAgent::new());
    let err = ExtractionLoop::new(invoker(&agent))
        .with_max_turns(0)
        .run(&resource("r1"))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Configuration(_)));
    assert_eq!(agent.call_count(), 0);
}

#[tokio::test]
async fn one_session_per_resource_kept_open() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .reply(rows(0, 1))
            .reply(rows(1, 1))
            .reply(wrap("[]"))
            .reply(wrap("[]")),
    );
    let extraction = ExtractionLoop::new(invoker(&agent));
    extraction.run(&resource("r1")).await.unwrap();
    extraction.run(&resource("r2")).await.unwrap();

    let requests = agent.requests();
    assert_eq!(requests.len(), 4);
    let first = &requests[0].session_id;
    assert!(requests[..3].iter().all(|r| &r.session_id == first));
    assert_ne!(&requests[3].session_id, first);
    assert!(requests.iter().all(|r| !r.end_session));
    assert_eq!(requests[0].agent_id, "AGENT");
    assert_eq!(requests[0].agent_alias_id, "ALIAS");
}

#[tokio::test]
async fn first_turn_asks_with_the_full_contract_then_continues_briefly() {
    let agent = Arc::new(ScriptedAgent::new().reply(rows(0, 1)).reply(wrap("[]")));
    let r = resource("r1").with_rrid("IMSR_JAX:000001");
    ExtractionLoop::new(invoker(&agent)).run(&r).await.unwrap();

    let requests = agent.requests();
    assert!(requests[0].input_text.contains("resource r1"));
    assert!(requests[0].input_text.contains("RRID:IMSR_JAX:000001"));
    assert!(requests[0].input_text.contains("<json_response>"));
    assert!(requests[1].input_text.contains("resource r1"));
    assert!(requests[1].input_text.len() < requests[0].input_text.len());
}

#[tokio::test]
async fn agent_failure_aborts_the_run() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .reply(rows(0, 2))
            .reply(rows(2, 2))
            .fail(HarvestError::Stream("connection reset".into())),
    );
    let err = ExtractionLoop::new(invoker(&agent))
        .run(&resource("r1"))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Stream(_)));
    assert_eq!(agent.call_count(), 3);
}

#[tokio::test]
async fn observer_sees_monotonic_totals() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .reply(rows(0, 2))
            .reply(rows(2, 1))
            .reply(wrap("[]")),
    );
    let events: Arc<Mutex<Vec<TurnEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    ExtractionLoop::new(invoker(&agent))
        .with_observer(Arc::new(move |event: &TurnEvent| {
            sink.lock().unwrap().push(event.clone())
        }))
        .run(&resource("r1"))
        .await
        .unwrap();

    let events = events.lock().unwrap();
    let totals: Vec<_> = events.iter().map(|e| e.total_rows).collect();
    assert_eq!(totals, vec![2, 3, 3]);
    let turns: Vec<_> = events.iter().map(|e| e.turn).collect();
    assert_eq!(turns, vec![0, 1, 2]);
}

#[tokio::test]
async fn policy_can_stop_early() {
    let agent = Arc::new(ScriptedAgent::new().with_fallback(rows(0, 2)));
    let report = ExtractionLoop::new(invoker(&agent))
        .with_policy(Arc::new(PredicateTermination::new(
            |_, _, accumulated| accumulated >= 4,
        )))
        .run(&resource("r1"))
        .await
        .unwrap();

    // Stops on the turn that saw 4 rows already; that turn's rows are kept.
    assert_eq!(report.turns, 3);
    assert_eq!(report.observations.len(), 6);
    assert_eq!(report.stop_reason, StopReason::Policy);
}

#[tokio::test]
async fn character_split_across_chunks_is_reassembled() {
    let reply = wrap(r#"[{"observationText":"gliomas by 7–9 months"}]"#);
    let dash = reply.find('–').unwrap();
    let agent = Arc::new(
        ScriptedAgent::new()
            .reply_split(&reply, dash + 1)
            .reply(wrap("[]")),
    );

    let report = ExtractionLoop::new(invoker(&agent))
        .run(&resource("r1"))
        .await
        .unwrap();

    assert_eq!(report.observations.len(), 1);
    assert_eq!(
        report.observations[0].observation_text.as_deref(),
        Some("gliomas by 7–9 months")
    );
    assert_eq!(report.stop_reason, StopReason::AgentExhausted);
}
