//! Raw SQL shared by several repositories.

/// Common table expressions resolving "latest" rows per chair and per ride.
///
/// - `latest_locations(chair_id, latitude, longitude)`: newest location sample of each chair.
/// - `latest_rides(id, chair_id)`: most recently created ride of each chair.
/// - `latest_ride_statuses(ride_id, status)`: newest status record of each ride.
///
/// Ties on `created_at` are broken by insertion order.
pub(crate) const LATEST_STATE_CTE: &str = r#"
    WITH latest_locations AS (
        SELECT chair_id, latitude, longitude
        FROM (
            SELECT chair_id, latitude, longitude,
                   ROW_NUMBER() OVER (PARTITION BY chair_id ORDER BY created_at DESC, rowid DESC) AS rn
            FROM chair_locations
        ) tmp
        WHERE rn = 1
    ),
    latest_rides AS (
        SELECT id, chair_id
        FROM (
            SELECT id, chair_id,
                   ROW_NUMBER() OVER (PARTITION BY chair_id ORDER BY created_at DESC, rowid DESC) AS rn
            FROM rides
            WHERE chair_id IS NOT NULL
        ) tmp
        WHERE rn = 1
    ),
    latest_ride_statuses AS (
        SELECT ride_id, status
        FROM (
            SELECT ride_id, status,
                   ROW_NUMBER() OVER (PARTITION BY ride_id ORDER BY created_at DESC, rowid DESC) AS rn
            FROM ride_statuses
        ) tmp
        WHERE rn = 1
    )
"#;

/// Filter selecting active chairs that are free to take a ride: the latest
/// ride is completed, or the chair was never assigned one.
pub(crate) const CHAIR_IS_AVAILABLE: &str = r#"
    chairs.is_active
    AND (latest_rides.id IS NULL OR latest_ride_statuses.status = 'COMPLETED')
"#;
