//! Users command handler
//!
//! Builds a composer from the CLI filters, issues one request and prints the
//! normalized page.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::cli::parser::UsersArgs;
use crate::composer::{FilterState, ListComposer, ListView, StaticCapabilities};
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::external::{HttpListEndpoint, ListEndpoint};
use crate::models::UserRecord;

pub struct UsersCommandHandler {
    config: Settings,
}

impl UsersCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self, args: &UsersArgs) -> AppResult<()> {
        let endpoint = Arc::new(HttpListEndpoint::new(&self.config.endpoint)?);
        let view = self.fetch(endpoint, args).await?;

        if args.json {
            let body = serde_json::to_string_pretty(&view).map_err(|e| AppError::Internal {
                source: e.into(),
            })?;
            println!("{}", body);
        } else {
            print!("{}", render_table(&view));
        }
        Ok(())
    }

    /// One composed request against `endpoint`.
    pub async fn fetch(
        &self,
        endpoint: Arc<dyn ListEndpoint>,
        args: &UsersArgs,
    ) -> AppResult<ListView<UserRecord>> {
        let composer: ListComposer<UserRecord> = ListComposer::builder(endpoint)
            .config(&self.config.composer)
            .capabilities(Arc::new(StaticCapabilities::from(&self.config.capabilities)))
            .filters(filters_from(args))
            .page(args.page.unwrap_or(1))
            .build()?;

        composer.refresh().await?;
        let view = composer.view().await;
        composer.close().await;
        Ok(view)
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

fn filters_from(args: &UsersArgs) -> FilterState {
    let mut filters = FilterState::new();
    if let Some(search) = &args.search {
        filters = filters.with_search(search.clone());
    }
    for tag in &args.facets {
        filters = filters.with_facet(*tag);
    }
    if let Some(date) = args.date {
        filters = filters.with_date(date);
    }
    filters
}

/// Plain-text table with a one-line pagination footer.
pub fn render_table(view: &ListView<UserRecord>) -> String {
    let mut out = String::new();
    if view.records.is_empty() {
        out.push_str("No users match the current filters.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>6}  {:<24}  {:<28}  {:<16}  {:<12}  FLAGS",
        "ID", "NAME", "EMAIL", "PHONE", "JOINED"
    );
    for user in &view.records {
        let _ = writeln!(
            out,
            "{:>6}  {:<24}  {:<28}  {:<16}  {:<12}  {}",
            user.id,
            truncate(&user.name, 24),
            truncate(user.email.as_deref().unwrap_or("-"), 28),
            truncate(user.phone.as_deref().unwrap_or("-"), 16),
            user.date_joined.as_deref().map(|d| truncate(d, 10)).unwrap_or_else(|| "-".to_string()),
            user.flags()
        );
    }

    let pagination = &view.pagination;
    if let Some((start, end)) = pagination.showing() {
        let _ = write!(out, "\nShowing {}-{} of {}", start, end, pagination.count);
    }
    if pagination.shows_controls() {
        let _ = write!(
            out,
            " (page {} of {}{}{})",
            pagination.current_page,
            pagination.total_pages,
            if pagination.has_previous { ", previous" } else { "" },
            if pagination.has_next { ", next" } else { "" },
        );
    }
    out.push('\n');
    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
