//! Retry, ping and sniff behaviour of the transport, read off the audit trail

use elastik::transport::{AuditEvent::*, PipelineFailure};
use elastik_testkit::{audit, Auditor, Rule, Times, VirtualCluster};
use std::time::Duration;

#[tokio::test]
async fn test_retries_every_node_then_gives_up() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .client_calls(Rule::fails(Times::Always))
            .static_pool()
            .all_defaults(),
    );

    let error = auditor
        .trace_failure(&[
            audit(PingSuccess).port(9200),
            audit(BadResponse).port(9200),
            audit(PingSuccess).port(9201),
            audit(BadResponse).port(9201),
            audit(PingSuccess).port(9202),
            audit(BadResponse).port(9202),
            audit(MaxRetriesReached),
        ])
        .await;
    assert_eq!(error.failure, PipelineFailure::MaxRetriesReached);

    let connection = auditor.cluster().connection();
    for port in [9200, 9201, 9202] {
        assert_eq!(connection.called(port), 1);
        assert_eq!(connection.pinged(port), 1);
        assert_eq!(connection.failures(port), 1);
    }
}

#[tokio::test]
async fn test_maximum_retries_caps_attempts() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .client_calls(Rule::fails(Times::Always).return_status(503))
            .static_pool()
            .settings(|s| s.disable_pings().maximum_retries(1)),
    );

    let error = auditor
        .trace_failure(&[
            audit(BadResponse).port(9200),
            audit(BadResponse).port(9201),
            audit(MaxRetriesReached),
        ])
        .await;
    assert_eq!(error.api_call.status, Some(503));
    assert_eq!(auditor.cluster().connection().called(9202), 0);
}

#[tokio::test]
async fn test_failed_node_is_skipped_on_later_calls() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .client_calls(Rule::fails(Times::Always).on_port(9200))
            .client_calls(Rule::succeeds(Times::Always))
            .static_pool()
            .settings(|s| s.disable_pings()),
    );

    auditor
        .trace_calls(&[
            &[audit(BadResponse).port(9200), audit(HealthyResponse).port(9201)],
            &[audit(HealthyResponse).port(9202)],
            &[audit(HealthyResponse).port(9201)],
        ])
        .await;
}

#[tokio::test]
async fn test_retry_timeout_stops_before_last_node() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .client_calls(Rule::fails(Times::Always).takes(Duration::from_secs(10)))
            .static_pool()
            .settings(|s| s.disable_pings().max_retry_timeout(Duration::from_secs(20))),
    );

    let error = auditor
        .trace_failure(&[
            audit(BadResponse).port(9200),
            audit(BadResponse).port(9201),
            audit(MaxTimeoutReached),
        ])
        .await;
    assert_eq!(error.failure, PipelineFailure::MaxTimeoutReached);
    assert_eq!(auditor.cluster().clock().elapsed(), Duration::from_secs(20));
}

#[tokio::test]
async fn test_call_longer_than_request_timeout_times_out() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(2)
            .client_calls(Rule::succeeds(Times::Always).takes(Duration::from_secs(90)))
            .static_pool()
            .settings(|s| s.disable_pings()),
    );

    let error = auditor
        .trace_failure(&[audit(BadResponse).port(9200), audit(MaxTimeoutReached)])
        .await;
    let exception = error.audit_trail()[0].exception.clone().unwrap_or_default();
    assert!(exception.contains("timed out"), "{}", exception);
    assert_eq!(auditor.cluster().clock().elapsed(), Duration::from_secs(60));
}

#[tokio::test]
async fn test_ping_failure_marks_node_dead_until_resurrection() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .ping(Rule::fails(Times::Always).on_port(9200))
            .static_pool()
            .all_defaults(),
    );

    auditor
        .trace_calls(&[
            &[
                audit(PingFailure).port(9200),
                audit(PingSuccess).port(9201),
                audit(HealthyResponse).port(9201),
            ],
            &[audit(PingSuccess).port(9202), audit(HealthyResponse).port(9202)],
            &[audit(HealthyResponse).port(9201)],
        ])
        .await;

    auditor.advance(Duration::from_secs(10 * 60));
    auditor
        .trace_call(&[
            audit(Resurrection).port(9200),
            audit(PingFailure).port(9200),
            audit(HealthyResponse).port(9201),
        ])
        .await;
    assert_eq!(auditor.cluster().connection().pinged(9200), 2);
}

#[tokio::test]
async fn test_all_nodes_dead_resurrects_closest() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(2)
            .client_calls(Rule::fails(Times::Always))
            .static_pool()
            .settings(|s| s.disable_pings()),
    );

    auditor
        .trace_failure(&[
            audit(BadResponse).port(9200),
            audit(BadResponse).port(9201),
            audit(MaxRetriesReached),
        ])
        .await;
    let error = auditor
        .trace_failure(&[
            audit(AllNodesDead),
            audit(Resurrection).port(9200),
            audit(BadResponse).port(9200),
        ])
        .await;
    assert_eq!(error.failure, PipelineFailure::BadResponse);
}

#[tokio::test]
async fn test_sniff_on_startup_reseeds_pool() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .sniff(Rule::succeeds(Times::Always).then_cluster(VirtualCluster::nodes(5)))
            .sniffing_pool()
            .all_defaults(),
    );

    auditor
        .trace_calls(&[
            &[
                audit(SniffOnStartup),
                audit(SniffSuccess).port(9200),
                audit(PingSuccess).port(9200),
                audit(HealthyResponse).port(9200),
            ],
            &[audit(PingSuccess).port(9201), audit(HealthyResponse).port(9201)],
        ])
        .await;

    let cluster = auditor.cluster();
    assert_eq!(cluster.client().transport().pool().node_count(), 5);
    assert_eq!(cluster.connection().ports(), vec![9200, 9201, 9202, 9203, 9204]);
}

#[tokio::test]
async fn test_sniffed_cluster_brings_its_own_rules() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(1)
            .client_calls(Rule::fails(Times::Always))
            .sniff(
                Rule::succeeds(Times::Always)
                    .then_cluster(VirtualCluster::nodes(2).client_calls(Rule::succeeds(Times::Always))),
            )
            .sniffing_pool()
            .settings(|s| s.disable_pings()),
    );

    auditor
        .trace_calls(&[
            &[
                audit(SniffOnStartup),
                audit(SniffSuccess).port(9200),
                audit(HealthyResponse).port(9200),
            ],
            &[audit(HealthyResponse).port(9201)],
        ])
        .await;

    let connection = auditor.cluster().connection();
    assert_eq!(connection.ports(), vec![9200, 9201]);
    assert_eq!(connection.successes(9200), 1);
    assert_eq!(connection.failures(9200), 0);
}

#[tokio::test]
async fn test_sniffed_cluster_brings_its_own_publish_addresses() {
    let cluster = VirtualCluster::nodes(2)
        .sniff(Rule::succeeds(Times::Always).then_cluster(VirtualCluster::nodes(2).sniff_should_return_fqdn()))
        .sniffing_pool()
        .settings(|s| s.disable_pings());

    assert!(cluster.client().root_node_info().await.unwrap().is_valid());

    let hosts: Vec<String> = cluster
        .client()
        .transport()
        .pool()
        .nodes()
        .iter()
        .filter_map(|n| n.uri.host_str().map(str::to_string))
        .collect();
    assert_eq!(hosts, vec!["fqdn9200", "fqdn9201"]);
}

#[tokio::test]
async fn test_sniff_on_startup_moves_past_failing_node() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .sniff(Rule::fails(Times::Always).on_port(9200))
            .sniffing_pool()
            .all_defaults(),
    );

    auditor
        .trace_call(&[
            audit(SniffOnStartup),
            audit(SniffFailure).port(9200),
            audit(SniffSuccess).port(9201),
            audit(PingSuccess).port(9200),
            audit(HealthyResponse).port(9200),
        ])
        .await;
}

#[tokio::test]
async fn test_sniff_on_connection_fault_then_retry() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(3)
            .client_calls(Rule::fails(Times::once()).on_port(9200))
            .sniffing_pool()
            .settings(|s| s.sniff_on_startup(false)),
    );

    auditor
        .trace_call(&[
            audit(PingSuccess).port(9200),
            audit(BadResponse).port(9200),
            audit(SniffOnFail),
            audit(SniffSuccess).port(9202),
            audit(PingSuccess).port(9200),
            audit(HealthyResponse).port(9200),
        ])
        .await;
}

#[tokio::test]
async fn test_stale_cluster_is_sniffed_again() {
    let auditor = Auditor::new(
        VirtualCluster::nodes(2)
            .sniffing_pool()
            .settings(|s| s.disable_pings().sniff_lifespan(Duration::from_secs(60 * 60))),
    );

    auditor
        .trace_call(&[
            audit(SniffOnStartup),
            audit(SniffSuccess).port(9200),
            audit(HealthyResponse).port(9200),
        ])
        .await;
    auditor.trace_call(&[audit(HealthyResponse).port(9201)]).await;

    auditor.advance(Duration::from_secs(2 * 60 * 60));
    auditor
        .trace_call(&[
            audit(SniffOnStaleCluster),
            audit(SniffSuccess),
            audit(HealthyResponse).port(9200),
        ])
        .await;
}

#[tokio::test]
async fn test_fqdn_publish_addresses_become_node_hosts() {
    let cluster = VirtualCluster::nodes(2)
        .sniff_should_return_fqdn()
        .sniffing_pool()
        .settings(|s| s.disable_pings());

    let response = cluster.client().root_node_info().await.unwrap();
    assert!(response.is_valid());

    let hosts: Vec<String> = cluster
        .client()
        .transport()
        .pool()
        .nodes()
        .iter()
        .filter_map(|n| n.uri.host_str().map(str::to_string))
        .collect();
    assert_eq!(hosts, vec!["fqdn9200", "fqdn9201"]);
}

#[tokio::test]
async fn test_sometimes_rule_succeeds_a_limited_number_of_times() {
    let cluster = VirtualCluster::nodes(1)
        .client_calls(Rule::succeeds(Times::twice()))
        .single_node_pool()
        .all_defaults();

    assert!(cluster.client().root_node_info().await.unwrap().is_valid());
    assert!(cluster.client().root_node_info().await.unwrap().is_valid());
    let error = cluster.client().root_node_info().await.unwrap_err();
    assert_eq!(error.error_type(), "bad_response");
    assert_eq!(cluster.connection().successes(9200), 2);
    assert_eq!(cluster.connection().failures(9200), 1);
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let cluster = VirtualCluster::nodes(3)
        .client_calls(Rule::fails(Times::Always).return_status(404).return_response(r#"{"error": "missing"}"#))
        .static_pool()
        .settings(|s| s.disable_pings());

    let response = cluster.client().root_node_info().await.unwrap();
    assert!(!response.is_valid());
    assert_eq!(response.status(), Some(404));
    assert_eq!(response.api_call().audit_trail.len(), 1);
    assert_eq!(response.api_call().audit_trail[0].event, BadRequest);
}

#[tokio::test]
async fn test_failing_rule_never_answers_with_success_status() {
    let cluster = VirtualCluster::nodes(1)
        .client_calls(Rule::fails(Times::Always).return_status(200))
        .single_node_pool()
        .all_defaults();

    let error = match cluster.client().root_node_info().await {
        Err(elastik::ElasticError::Pipeline(e)) => e,
        other => panic!("expected a pipeline error, got {:?}", other.map(|r| r.status())),
    };
    assert_eq!(error.api_call.status, Some(502));
    assert_eq!(error.failure, PipelineFailure::BadResponse);
}
