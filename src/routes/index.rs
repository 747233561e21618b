use crate::{client::ClientState, routes::roster_ui::render_roster, state::RosterState};
use axum::extract::State;
use maud::Markup;

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    state.render(render_roster(&ClientState::first_load()))
}
