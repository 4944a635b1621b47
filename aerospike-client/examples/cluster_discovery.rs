//! Example: seed a cluster and print partition ownership.
//!
//! Run with: `cargo run --example cluster_discovery -- 127.0.0.1:3000 test`
//!
//! Requires an Aerospike server reachable at the given host.

use aerospike_client::{ClientConfig, Cluster, Host, PARTITION_COUNT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let host: Host = args.next().as_deref().unwrap_or("127.0.0.1:3000").parse()?;
    let namespace = args.next().unwrap_or_else(|| "test".to_string());

    let config = ClientConfig::builder().add_host(host).build()?;
    let cluster = Cluster::new(config);

    let added = cluster.seed().await?;
    println!("Seeded {} node(s)", added);
    for node in cluster.nodes().await {
        println!(
            "  {} build={} new-info={}",
            node,
            node.build().map(|b| b.to_string()).unwrap_or_default(),
            node.supports_new_info()
        );
    }

    let refreshed = cluster.tend_once().await;
    println!("Refreshed partitions from {} node(s)\n", refreshed);

    let map = cluster.partition_map();
    let owned = (0..PARTITION_COUNT)
        .filter(|&id| map.owner(&namespace, id).is_some())
        .count();
    println!("{}: {}/{} partitions owned", namespace, owned, PARTITION_COUNT);

    Ok(())
}
