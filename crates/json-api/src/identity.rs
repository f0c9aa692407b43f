//! Caller identity middleware.
//!
//! Authentication happens in front of this service. The gateway forwards who the caller is in
//! request headers, which are parsed here and stored in the depot for handlers.

use salvo::prelude::*;
use uuid::Uuid;

use storefront_app::domain::identity::{CartIdentity, Caller, Role, SessionToken, UserUuid};

use crate::extensions::*;

pub(crate) const USER_HEADER: &str = "x-user-uuid";
pub(crate) const SESSION_HEADER: &str = "x-session-token";
pub(crate) const ROLE_HEADER: &str = "x-user-role";

/// Identity forwarded with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestIdentity {
    pub(crate) user: Option<UserUuid>,
    pub(crate) session: Option<SessionToken>,
    pub(crate) role: Role,
}

impl RequestIdentity {
    pub(crate) fn cart_identity(&self) -> Option<CartIdentity> {
        self.user
            .map(CartIdentity::User)
            .or_else(|| self.session.clone().map(CartIdentity::Anonymous))
    }

    pub(crate) fn caller(&self) -> Option<Caller> {
        self.user.map(|user| Caller { user, role: self.role })
    }
}

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match parse_identity(req) {
        Ok(identity) => {
            depot.insert_identity(identity);

            ctrl.call_next(req, depot, res).await;
        }
        Err(error) => {
            res.render(error);

            ctrl.skip_rest();
        }
    }
}

fn parse_identity(req: &Request) -> Result<RequestIdentity, StatusError> {
    let user = match header(req, USER_HEADER) {
        Some(value) => Some(
            Uuid::parse_str(value)
                .map(UserUuid::from_uuid)
                .map_err(|_ignored| StatusError::bad_request().brief("Invalid x-user-uuid header"))?,
        ),
        None => None,
    };

    let session = header(req, SESSION_HEADER).map(SessionToken::new);

    let role = match header(req, ROLE_HEADER) {
        None | Some("customer") => Role::Customer,
        Some("admin") => Role::Admin,
        Some(_) => return Err(StatusError::bad_request().brief("Invalid x-user-role header")),
    };

    if user.is_none() && session.is_none() {
        return Err(StatusError::unauthorized().brief("Missing caller identity"));
    }

    Ok(RequestIdentity {
        user,
        session,
        role,
    })
}

fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
