use std::error::Error;

use tripview::client::{ClientOptions, PlanClient};
use tripview::view::profile::ProfileView;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let client = PlanClient::new(
        &ClientOptions {
            jwt: std::env::var("TRIPVIEW_JWT").ok(),
            ..ClientOptions::default()
        },
        "https://planner.example/",
    )?;
    let profile = ProfileView::load(&client, "alice").await;

    println!("Saved plans: {}", profile.plans.len());
    for plan in profile.plans.iter() {
        println!("{} {} {}", plan.id, plan.destination, plan.travel_date);
    }
    if let Some(place) = profile.most_searched.as_deref() {
        println!("Most searched: {place}");
    }

    Ok(())
}
