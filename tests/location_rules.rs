mod common;

use common::{create_location, setup};
use pos_api::entities::location::LocationKind;
use pos_api::services::locations::{CreateLocationInput, UpdateLocationInput};

#[tokio::test]
async fn first_location_becomes_default_automatically() {
    let app = setup().await;
    let id = create_location(&app, "Main", false).await;

    let default = app
        .services
        .locations
        .get_default()
        .await
        .expect("query")
        .expect("a default exists");
    assert_eq!(default.id, id);
}

#[tokio::test]
async fn there_is_never_more_than_one_default() {
    let app = setup().await;
    let first = create_location(&app, "Main", true).await;
    let second = create_location(&app, "Shop", true).await;

    let (locations, _) = app.services.locations.list(1, 50).await.expect("list");
    let defaults: Vec<_> = locations.iter().filter(|l| l.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, second);

    app.services
        .locations
        .set_default(first)
        .await
        .expect("set default back");
    let (locations, _) = app.services.locations.list(1, 50).await.expect("list");
    let defaults: Vec<_> = locations.iter().filter(|l| l.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, first);
}

#[tokio::test]
async fn default_location_cannot_be_deleted() {
    let app = setup().await;
    let id = create_location(&app, "Main", true).await;

    assert!(app.services.locations.delete(id).await.is_err());

    // A non-default one deletes fine.
    let other = create_location(&app, "Shop", false).await;
    app.services.locations.delete(other).await.expect("delete");
}

#[tokio::test]
async fn default_location_cannot_be_deactivated() {
    let app = setup().await;
    let id = create_location(&app, "Main", true).await;

    let result = app
        .services
        .locations
        .update(
            id,
            UpdateLocationInput {
                name: None,
                kind: None,
                is_active: Some(false),
            },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn inactive_location_cannot_become_default() {
    let app = setup().await;
    create_location(&app, "Main", true).await;
    let other = create_location(&app, "Shop", false).await;

    app.services
        .locations
        .update(
            other,
            UpdateLocationInput {
                name: None,
                kind: None,
                is_active: Some(false),
            },
        )
        .await
        .expect("deactivate");

    assert!(app.services.locations.set_default(other).await.is_err());
}

#[tokio::test]
async fn kind_round_trips_through_storage() {
    let app = setup().await;
    let created = app
        .services
        .locations
        .create(CreateLocationInput {
            name: "Online".to_string(),
            kind: LocationKind::Virtual,
            is_default: false,
        })
        .await
        .expect("create");
    assert_eq!(created.kind, "virtual");
}
