//! Bounded session transcript.

use mirrorbrain_core::types::{Message, Session};

/// Append a message, trimming the oldest entries past `max_messages`.
pub fn push_bounded(session: &mut Session, message: Message, max_messages: usize) {
    session.messages.push(message);
    if session.messages.len() > max_messages {
        let excess = session.messages.len() - max_messages;
        session.messages.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorbrain_core::types::{Role, SessionMode};

    #[test]
    fn trims_oldest_past_the_bound() {
        let mut session = Session::new(SessionMode::Local);
        for i in 0..5 {
            push_bounded(&mut session, Message::new(Role::User, format!("m{i}")), 3);
        }
        let contents: Vec<_> = session.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn no_trim_under_the_bound() {
        let mut session = Session::new(SessionMode::Local);
        push_bounded(&mut session, Message::new(Role::User, "hello"), 3);
        assert_eq!(session.messages.len(), 1);
    }
}
