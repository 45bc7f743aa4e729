use std::error::Error;

use tripview::client::{ClientOptions, PlanClient};
use tripview::session::SearchContext;
use tripview::view::PlanSession;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let ctx = SearchContext::from_page_url(
        "https://planner.example/v1/plans?location=Paris&date=2024-05-02&numberResults=5",
    )?;
    let client = PlanClient::for_page(&ClientOptions::default(), &ctx)?;

    let mut session = PlanSession::new(ctx, "guest", 5, 5);
    if !session.on_ready(&client).await {
        println!("no plans available");
        return Ok(());
    }

    let outcome = session.load_more(&client).await;
    println!(
        "rendered {} more plans (fetched: {})",
        outcome.rendered.len(),
        outcome.fetched
    );
    for plan in outcome.rendered {
        for binding in plan.bindings {
            println!("{} -> {}", binding.key, binding.plan_id);
        }
    }
    println!("load more visible: {}", session.load_more_visible());

    Ok(())
}
