use dioxus::prelude::*;
use dioxus_router::Routable;

use crate::views::StudyView;

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/", StudyView)] Study {},
}
