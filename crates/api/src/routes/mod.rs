pub mod accounts;
pub mod health;
pub mod identity;
pub mod monetization;
pub mod site;
pub mod wiki;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /identity/auth-codes                              request auth code (public)
/// /identity/register                                register (public)
/// /identity/login                                   login (public)
/// /identity/refresh                                 refresh (public)
/// /identity/logout                                  logout (requires auth)
/// /identity/me                                      current identity + role
/// /identity/principals/{identity_id}/role           change role (admin, PUT)
///
/// /wiki/{kind}s                                     published list (public)
/// /wiki/{kind}s/{id}                                published detail (public)
/// /wiki/{kind}s/{id}/drafts                         start editing published (POST)
/// /wiki/{kind}s/drafts                              list, create drafts
/// /wiki/{kind}s/drafts/{id}                         get, update draft
/// /wiki/{kind}s/drafts/{id}/submit                  Pending -> UnderReview
/// /wiki/{kind}s/drafts/{id}/approve                 UnderReview -> Approved
/// /wiki/{kind}s/drafts/{id}/reject                  UnderReview -> Rejected
/// /wiki/{kind}s/drafts/{id}/publish                 Approved -> published
/// /wiki/{kind}s/drafts/{id}/translate               create missing languages
/// /wiki/groups/{id}/members                         published members of a group
///
/// /accounts                                         list mine, create
/// /accounts/{id}                                    get (members)
/// /accounts/{id}/members                            list, add (owners)
/// /accounts/{id}/members/{identity_id}              change role, remove (owners)
/// /accounts/{id}/affiliations                       affiliations of an account
/// /accounts/affiliations                            request affiliation
/// /accounts/affiliations/{id}                       get
/// /accounts/affiliations/{id}/approve               approve (counter-party)
/// /accounts/affiliations/{id}/reject                reject (counter-party)
/// /accounts/affiliations/{id}/terminate             terminate (either side)
///
/// /monetization/payments                            create (authorize)
/// /monetization/payments/{id}                       get
/// /monetization/payments/{id}/capture               capture (owners)
/// /monetization/payments/{id}/cancel                cancel (owners)
/// /monetization/payments/{id}/refund                refund (owners)
/// /monetization/accounts/{id}/payments              list payments
/// /monetization/accounts/{id}/settlement-account    get settlement account
/// /monetization/accounts/{id}/settlements/batches   list batches
/// /monetization/settlement-accounts                 create settlement account
/// /monetization/settlements/batches                 close a batch (admin)
/// /monetization/settlements/batches/{id}            batch with transfers
///
/// /site/announcements                               published list (public)
/// /site/announcements/{id}                          published detail (public)
/// /site/contacts                                    submit contact (public)
/// /site/admin/announcements                         list, create (admin)
/// /site/admin/announcements/{id}                    update, delete (admin)
/// /site/admin/contacts                              inbox (admin)
/// /site/admin/contacts/{id}                         contact detail (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/identity", identity::router())
        .nest("/wiki", wiki::router())
        .nest("/accounts", accounts::router())
        .nest("/monetization", monetization::router())
        .nest("/site", site::router())
}
