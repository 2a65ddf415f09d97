#[tokio::main]
async fn main() -> anyhow::Result<()> {
    art_flow_lib::run().await
}
