pub mod alerts;
pub mod analytics;
pub mod api_key;
pub mod auth;
pub mod cycles;
pub mod details;
pub mod dosage;
pub mod groups;
pub mod health;
pub mod hospitals;
pub mod illnesses;
pub mod ingredients;
pub mod medical_info;
pub mod medications;
pub mod prescription_medications;
pub mod prescriptions;
pub mod records;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy (auth required unless noted):
///
/// ```text
/// /auth/register                    register (public)
/// /auth/login                       login (public)
/// /auth/refresh                     refresh (public)
/// /auth/logout                      logout
///
/// /users/me                         get, update, deactivate
/// /users/me/medical-summary         medical summary
/// /api-key                          show masked, issue
///
/// /hospitals                        list, create
/// /hospitals/save                   upsert by code
/// /hospitals/{id}                   get, update, delete
/// /illnesses                        list, create
/// /illnesses/save                   upsert by name and type
/// /illnesses/{id}                   get, update, delete
/// /medications                      list (?search), create (admin)
/// /medications/{item_seq}           get with ingredients, update (admin), delete (admin)
/// /medications/{item_seq}/ingredients  add an ingredient (admin)
/// /ingredients                      list, create (admin)
/// /ingredients/search               search by name (?name)
/// /ingredients/{code}               get
/// /ingredients/{code}/combinations  other members of a combination product
///
/// /medical-info                     list, create
/// /medical-info/search              search by hospital and illness name
/// /medical-info/register-visit      visit with a fresh prescription
/// /medical-info/{id}                get, update, delete
///
/// /prescriptions                    list, create
/// /prescriptions/active             active only
/// /prescriptions/shared             one prescription for several medical infos
/// /prescriptions/renew              renewal with group, cycle, details, alerts
/// /prescriptions/{id}               get, update, delete
/// /prescriptions/{id}/supersede     replace with a new prescription
/// /prescription-medications         list (?prescription_id), create
/// /prescription-medications/{id}    get, update, delete
///
/// /groups                           list, create
/// /groups/active                    active only
/// /groups/{id}                      get (with active cycles), update, delete
/// /cycles                           list (?group_id), create
/// /cycles/current                   cycles covering today
/// /cycles/expiration                expiring and expired cycles
/// /cycles/{id}                      get, update, delete
/// /details                          list (?cycle_id), create
/// /details/today                    details with stock in current cycles
/// /details/low-stock                details at or below 5 units
/// /details/{id}                     get (with records), update, delete
///
/// /records                          list (filtered), create
/// /records/today                    today's records
/// /records/statistics               short window summary
/// /records/bulk                     check-in per item
/// /records/{id}                     get, update, delete
/// /alerts                           list, create
/// /alerts/active                    active only
/// /alerts/upcoming                  due within the next hour
/// /alerts/{id}                      get, update, delete
///
/// /dosage/today                     daily schedule
/// /dosage/next                      next dose
/// /dosage/check                     daily check-in
///
/// /analytics/statistics             per-type counts
/// /analytics/compliance             taken percentage
/// /analytics/low-stock              stock projections
/// /analytics/side-effects           side effects by drug
/// /analytics/timing                 intake hour buckets
/// /analytics/adherence              per-day and per-drug report
/// /analytics/trends                 ISO-week trends
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and account.
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/api-key", api_key::router())
        // Reference data.
        .nest("/hospitals", hospitals::router())
        .nest("/illnesses", illnesses::router())
        .nest("/medications", medications::router())
        .nest("/ingredients", ingredients::router())
        // Treatment episodes and prescriptions.
        .nest("/medical-info", medical_info::router())
        .nest("/prescriptions", prescriptions::router())
        .nest("/prescription-medications", prescription_medications::router())
        // Groups, cycles and per-cycle details.
        .nest("/groups", groups::router())
        .nest("/cycles", cycles::router())
        .nest("/details", details::router())
        // Intake tracking.
        .nest("/records", records::router())
        .nest("/alerts", alerts::router())
        .nest("/dosage", dosage::router())
        .nest("/analytics", analytics::router())
}
