use clap::Args;

use nestnote_daemon::http_server::api::client::ApiError;
use nestnote_daemon::http_server::api::v0::auth::me::MeRequest;

#[derive(Args, Debug, Clone)]
pub struct Me;

#[derive(Debug, thiserror::Error)]
pub enum MeError {
    #[error("{0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Me {
    type Error = MeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let profile = ctx.client.call(MeRequest).await?;

        let mut lines = Vec::new();
        lines.push(format!("{} <{}>", profile.name, profile.email));
        lines.push(format!("  id:   {}", profile.id));
        lines.push(format!("  role: {}", profile.role));

        if let Some(parent) = &profile.parent {
            lines.push(format!("  parent: {} <{}>", parent.name, parent.email));
        }
        for child in &profile.children {
            lines.push(format!("  child:  {} <{}>", child.name, child.email));
        }

        Ok(lines.join("\n"))
    }
}
