mod common;
use common::utils::spawn_app;

use hockey_bingo_backend::config::settings::SchedulerSettings;
use hockey_bingo_backend::services::SchedulerService;

fn every_two_minutes() -> SchedulerSettings {
    SchedulerSettings {
        cron: "0 */2 * * * *".to_string(),
        batch_budget_seconds: 300,
    }
}

#[tokio::test]
async fn scheduler_registers_the_update_job_once() {
    let app = spawn_app().await;
    let scheduler = SchedulerService::new(app.services.updates.clone(), &every_two_minutes())
        .await
        .expect("Failed to create scheduler service");

    assert!(!scheduler.is_scheduled().await);
    scheduler.start().await.expect("Failed to start scheduler");
    assert!(scheduler.is_scheduled().await);

    let first = scheduler.schedule_square_updates().await.unwrap();
    let second = scheduler.schedule_square_updates().await.unwrap();
    assert_eq!(first, second);

    scheduler.stop().await.expect("Failed to stop scheduler");
}

#[tokio::test]
async fn invalid_cron_expression_is_rejected() {
    let app = spawn_app().await;
    let settings = SchedulerSettings {
        cron: "every now and then".to_string(),
        batch_budget_seconds: 300,
    };
    let scheduler = SchedulerService::new(app.services.updates.clone(), &settings)
        .await
        .expect("Failed to create scheduler service");

    assert!(scheduler.schedule_square_updates().await.is_err());
    assert!(!scheduler.is_scheduled().await);
}
