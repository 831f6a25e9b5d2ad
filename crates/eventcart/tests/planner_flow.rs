use async_trait::async_trait;
use eventcart::api::Planner;
use eventcart::catalog::StaticCatalog;
use eventcart::config::PlannerConfig;
use eventcart::error::{EventCartError, Result};
use eventcart::filter::{FilterCriteria, PriceBand};
use eventcart::model::{CompositeId, DetailType};
use eventcart::reactions::ReactionChange;
use eventcart::session::{SavedSessions, SessionData, SessionRepository};
use eventcart::state::CartStatus;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

const CATALOG: &str = r#"[
    {"id": "rec1", "name": "Taco Bar", "price": "$18.50", "pricing": "per guest",
     "min_headcount": "20", "duration": "3 hours", "status": "Available"},
    {"id": "rec2", "name": "Photo Booth", "price": "$350", "duration": "4 hours",
     "status": "Available", "options": "Props kit | +$40\nPrint package | +$120 | +1 hour"},
    {"id": "rec3", "name": "String Quartet", "price": "Call for quote", "status": "Waitlist"},
    {"id": "", "name": "Blank row"},
    {"id": "rec4", "name": "Lawn Games", "price": "$75", "duration": "All day"}
]"#;

#[derive(Default)]
struct SharedStore {
    sessions: Mutex<HashMap<String, SessionData>>,
    next_id: Mutex<u32>,
}

#[async_trait]
impl SessionRepository for SharedStore {
    async fn load(&self, session_id: &str) -> Result<SessionData> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| EventCartError::SessionNotFound(session_id.to_string()))
    }

    async fn create(&self, data: &SessionData) -> Result<String> {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let id = format!("sess{}", next);
        self.sessions
            .lock()
            .unwrap()
            .insert(id.clone(), data.clone());
        Ok(id)
    }

    async fn update(&self, session_id: &str, data: &SessionData) -> Result<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), data.clone());
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn setup(user: &str) -> Planner {
    init_tracing();
    let mut planner = Planner::new(PlannerConfig {
        user_name: Some(user.to_string()),
        page_size: 2,
        ..Default::default()
    });
    let catalog = StaticCatalog::from_json(CATALOG).unwrap();
    let count = planner.load_catalog(&catalog).await.unwrap();
    assert_eq!(count, 4);
    planner
}

#[tokio::test]
async fn test_browse_filter_and_page() {
    let planner = setup("ana").await;

    let criteria = FilterCriteria::default().with_price_band(PriceBand::Over250);
    let names: Vec<&str> = planner
        .catalog_view(&criteria)
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(names, vec!["Photo Booth"]);

    // Unknown prices only show up under "all".
    let waitlist = FilterCriteria::default().with_status("Waitlist");
    assert_eq!(planner.catalog_view(&waitlist).len(), 1);
    let waitlist_cheap = waitlist.with_price_band(PriceBand::Under50);
    assert!(planner.catalog_view(&waitlist_cheap).is_empty());

    let all = FilterCriteria::default();
    let mut rendered = Vec::new();
    while let Some(range) = planner
        .load_more(&all, |page| {
            rendered.extend(page.into_iter().map(|i| i.id));
            async {}
        })
        .await
    {
        assert!(range.len() <= 2);
    }
    assert_eq!(rendered, vec!["rec1", "rec2", "rec3", "rec4"]);
}

#[tokio::test]
async fn test_plan_undo_and_totals() {
    let mut planner = setup("ana").await;
    planner.set_detail(DetailType::GuestCount, "30");

    let tacos = CompositeId::item("rec1");
    let booth = CompositeId::with_option("rec2", 1);
    assert!(planner.favorite(tacos.clone()));
    assert!(planner.favorite(booth.clone()));
    assert!(planner.lock(booth.clone()));

    let view = planner.cart_view();
    assert_eq!(view.favorited[0].quantity, 30);
    assert_eq!(view.favorited_total, 555.0);
    assert_eq!(view.locked_in[0].name, "Photo Booth (Print package)");
    assert_eq!(view.locked_in_total, 470.0);

    // Below the minimum headcount, the minimum is billed.
    planner.set_quantity(&tacos, 12);
    assert_eq!(planner.cart_view().favorited_total, 370.0);

    assert!(planner.undo());
    assert_eq!(planner.state().entry(&tacos).unwrap().quantity, 30);
    assert!(planner.undo());
    assert_eq!(planner.state().status(&booth), Some(CartStatus::Favorited));

    // A new event after undo discards the redo branch.
    planner.set_requests(&tacos, "No cilantro");
    assert!(!planner.history_buttons().can_redo);
    assert!(!planner.redo());
}

#[tokio::test]
async fn test_collaborators_share_a_session() {
    let store = SharedStore::default();
    let dir = TempDir::new().unwrap();
    let mut saved = SavedSessions::open(dir.path().join("sessions.json")).unwrap();

    let mut ana = setup("ana").await;
    ana.set_detail(DetailType::EventName, "Summer offsite");
    ana.lock(CompositeId::item("rec4"));
    assert_eq!(ana.react("rec4", "👍"), ReactionChange::Added);
    let id = ana.save_session(&store).await.unwrap();
    saved.remember(&id, &ana.display_name()).unwrap();
    assert_eq!(ana.share_link(), Some(format!("https://plan.example.com/?session={}", id)));

    let mut ben = setup("ben").await;
    ben.load_session(&store, &id).await.unwrap();
    assert_eq!(ben.react("rec4", "😍"), ReactionChange::Added);
    ben.favorite(CompositeId::item("rec3"));
    assert_eq!(ben.save_session(&store).await.unwrap(), id);

    ana.load_session(&store, &id).await.unwrap();
    assert_eq!(ana.state().collaborators, vec!["ana".to_string(), "ben".to_string()]);
    assert_eq!(ana.state().reactions.score("rec4"), 6);
    let favorited = ana.cart_view().favorited;
    assert_eq!(favorited[0].unit_price, None);
    assert_eq!(favorited[0].line_total, 0.0);

    let reopened = SavedSessions::open(dir.path().join("sessions.json")).unwrap();
    assert_eq!(reopened.name_of(&id), Some("Summer offsite"));
}

#[tokio::test]
async fn test_missing_session_is_reported() {
    let store = SharedStore::default();
    let mut planner = setup("ana").await;
    let err = planner.load_session(&store, "nope").await.unwrap_err();
    assert!(matches!(err, EventCartError::SessionNotFound(_)));
    assert!(planner.state().session_id.is_none());
    assert_eq!(planner.messages().len(), 1);
}
