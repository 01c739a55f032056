// Route table queries and route submissions via data.lua

use super::{RouterClient, SessionId};
use crate::error::AppResult;
use crate::routes::{Route, parser};

impl RouterClient {
    /// Fetch the static route table in display order.
    pub async fn fetch_routes(&self, session: &SessionId) -> AppResult<Vec<Route>> {
        let form = [
            ("sid", session.as_str()),
            ("page", "static_route_table"),
            ("xhr", "1"),
        ];
        let html = self.post_data(&form).await?;
        let routes = parser::parse_route_table(&html)?;
        tracing::info!("Router has {} static route(s)", routes.len());
        Ok(routes)
    }

    /// Create or update the route in its table slot.
    ///
    /// The router answers with a rendered page and no status, so any
    /// response that arrives counts as success.
    pub async fn apply_route(&self, session: &SessionId, route: &Route) -> AppResult<()> {
        let mut form = route.form_fields()?;
        form.push(("sid".to_string(), session.as_str().to_string()));
        self.post_data(&form).await?;
        tracing::info!("Submitted {}", route);
        Ok(())
    }
}
