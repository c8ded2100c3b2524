//! Typing indicator projections. Nothing here is sent over the wire.

use crate::store::ChatState;

/// Am I composing? True whenever the input buffer is non-empty.
pub fn is_composing(state: &ChatState) -> bool {
    !state.draft.is_empty()
}

/// Is the selected partner typing to me?
pub fn partner_typing(state: &ChatState) -> bool {
    let (Some(me), Some(partner), Some(typer)) = (state.user_id(), state.receiver_id(), state.typer.as_ref()) else {
        return false;
    };
    state.typing && typer.receiver_id == me && typer.sender_id != me && typer.sender_id == partner
}
