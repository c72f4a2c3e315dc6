use clap::Args;

use crate::cmd::render::render_view;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::workflow::filter::PriorityFilter;
use crate::workflow::list::TicketListView;

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// All, Low, Medium or High.
    #[arg(short, long, value_parser = parse_priority_filter, default_value = "all")]
    pub priority: PriorityFilter,
    /// Match against title or email, ignoring case.
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// Page to show, starting at 1.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,
}

pub fn parse_priority_filter(value: &str) -> Result<PriorityFilter, String> {
    PriorityFilter::from_str(value)
        .ok_or_else(|| format!("expected All, Low, Medium or High, got '{value}'"))
}

pub async fn load_view(ctx: &AppContext) -> AppResult<TicketListView> {
    let mut view = TicketListView::new();
    if !view.fetch(ctx.store.as_ref()).await {
        return Err(AppError::Backend(
            "could not load tickets; see the log output above".to_string(),
        ));
    }
    Ok(view)
}

pub async fn run(ctx: &AppContext, args: ListArgs) -> AppResult<String> {
    let mut view = load_view(ctx).await?;
    view.set_priority_filter(args.priority);
    view.set_search(args.search);
    view.go_to_page(usize::try_from(args.page).unwrap_or(usize::MAX));
    Ok(render_view(&view))
}
