use super::Session;
use anyhow::Result;
use elastik::request::ClusterHealthDescriptor;
use elastik::response::NodeInfo;
use elastik::transport::nodes_from_response;

pub async fn run_info(session: &Session) -> Result<()> {
    let response = session.client.root_node_info().await?;
    let uri = response.api_call().uri.clone();
    let info = session.body(response)?;

    println!("Node:     {} ({})", info.name, uri);
    println!("Cluster:  {}", info.cluster_name.as_deref().unwrap_or("-"));
    println!("UUID:     {}", info.cluster_uuid.as_deref().unwrap_or("-"));
    println!("Version:  {}", info.version.number);
    println!("Lucene:   {}", info.version.lucene_version);
    println!("Tagline:  {}", info.tagline);
    Ok(())
}

pub async fn run_ping(session: &Session) -> Result<()> {
    let response = session.client.ping().await?;
    session.trace(&response);

    if !response.is_valid() {
        anyhow::bail!(
            "Ping to {} failed with status {}",
            response.api_call().uri,
            response.status().map_or_else(|| "-".to_string(), |s| s.to_string())
        );
    }
    println!("{} is up", response.api_call().uri);
    Ok(())
}

pub async fn run_health(
    session: &Session,
    index: Option<String>,
    wait_for_status: Option<String>,
    level: Option<String>,
) -> Result<()> {
    let mut descriptor = ClusterHealthDescriptor::new();
    if let Some(index) = index {
        descriptor = descriptor.index(index);
    }
    if let Some(status) = wait_for_status {
        descriptor = descriptor.wait_for_status(status);
    }
    if let Some(level) = level {
        descriptor = descriptor.level(level);
    }

    let health = session.body(session.client.cluster_health(descriptor).await?)?;

    println!("Cluster Health");
    println!("==============");
    println!("Cluster:        {}", health.cluster_name);
    println!("Status:         {}", health.status);
    println!("Timed out:      {}", health.timed_out);
    println!("Nodes:          {} ({} data)", health.number_of_nodes, health.number_of_data_nodes);
    println!(
        "Shards:         {} active, {} primary",
        health.active_shards, health.active_primary_shards
    );
    println!(
        "                {} relocating, {} initializing, {} unassigned",
        health.relocating_shards, health.initializing_shards, health.unassigned_shards
    );
    println!("Pending tasks:  {}", health.number_of_pending_tasks);
    if let Some(percent) = health.active_shards_percent_as_number {
        println!("Active shards:  {:.1}%", percent);
    }
    Ok(())
}

/// Every node in the cluster, and whether the client would route requests to it
pub async fn run_sniff(session: &Session) -> Result<()> {
    let response = session.client.nodes_info().await?;
    let scheme = response.api_call().uri.scheme().to_string();
    let nodes = session.body(response)?;

    let usable: Vec<String> = nodes_from_response(&nodes, &scheme)
        .into_iter()
        .filter_map(|n| n.id)
        .collect();

    let mut ids: Vec<&String> = nodes.nodes.keys().collect();
    ids.sort();

    println!(
        "Cluster: {} ({} nodes)",
        nodes.cluster_name.as_deref().unwrap_or("-"),
        ids.len()
    );
    println!();
    println!(
        "{:<24} {:<20} {:<24} {:<16} {:<6}",
        "NODE", "NAME", "PUBLISH", "ROLES", "USED"
    );
    println!("{}", "-".repeat(94));
    for id in ids {
        let info = &nodes.nodes[id];
        println!(
            "{:<24} {:<20} {:<24} {:<16} {:<6}",
            id,
            info.name.as_deref().unwrap_or("?"),
            publish_address(info),
            roles(info),
            if usable.contains(id) { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn publish_address(info: &NodeInfo) -> &str {
    info.http
        .as_ref()
        .map(|h| h.publish_address.as_str())
        .unwrap_or("-")
}

fn roles(info: &NodeInfo) -> String {
    let mut roles = Vec::new();
    if info.master_eligible() {
        roles.push("master");
    }
    if info.holds_data() {
        roles.push("data");
    }
    if info.ingest_enabled() {
        roles.push("ingest");
    }
    if roles.is_empty() {
        "-".to_string()
    } else {
        roles.join(",")
    }
}
