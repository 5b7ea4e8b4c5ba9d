use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        let mut lines = Vec::new();
        lines.push(format!("Daemon ({}):", base));

        let readyz_url = format!("{}/_status/readyz", base.as_str().trim_end_matches('/'));
        match client.get(&readyz_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                lines.push("  readyz:   OK".to_string());
            }
            Ok(resp) => {
                lines.push(format!("  readyz:   UNHEALTHY ({})", resp.status()));
            }
            Err(_) => {
                lines.push("  readyz:   NOT REACHABLE".to_string());
            }
        }

        let versionz_url = format!("{}/_status/versionz", base.as_str().trim_end_matches('/'));
        match client.get(&versionz_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let body = resp.text().await.unwrap_or_default();
                lines.push(format!("  versionz: {}", body));
            }
            Ok(resp) => {
                lines.push(format!("  versionz: UNHEALTHY ({})", resp.status()));
            }
            Err(_) => {
                lines.push("  versionz: NOT REACHABLE".to_string());
            }
        }

        Ok(lines.join("\n"))
    }
}
