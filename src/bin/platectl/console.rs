use platectl::controller::UiEvent;

/// A line typed at the interactive console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One or more page events, dispatched in order.
    Events(Vec<UiEvent>),
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        // `connect` alone reuses whatever is in the address field.
        "connect" | "c" if rest.is_empty() => Command::Events(vec![UiEvent::ConnectClicked]),
        "connect" | "c" => Command::Events(vec![
            UiEvent::AddressEdited(rest.to_string()),
            UiEvent::AddressSubmitted,
        ]),
        "address" | "a" => Command::Events(vec![UiEvent::AddressEdited(rest.to_string())]),
        "capture" | "cap" => Command::Events(vec![UiEvent::CaptureClicked]),
        "retry" | "r" => Command::Events(vec![UiEvent::RetryClicked]),
        "status" | "s" => Command::Status,
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(word.to_string()),
    };
    Some(command)
}

pub const HELP: &str = "\
Commands:
  connect <address>   set the camera address and connect
  connect             connect to the address already entered
  address <address>   edit the camera address without connecting
  capture             freeze/capture a frame and recognize the plate
  retry               return to the live stream
  status              show the backend status
  help                show this help
  quit                leave the console";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_with_address_edits_then_submits() {
        assert_eq!(
            parse("connect  192.168.0.7:8080 "),
            Some(Command::Events(vec![
                UiEvent::AddressEdited("192.168.0.7:8080".to_string()),
                UiEvent::AddressSubmitted,
            ]))
        );
    }

    #[test]
    fn bare_connect_clicks_the_button() {
        assert_eq!(
            parse("connect"),
            Some(Command::Events(vec![UiEvent::ConnectClicked]))
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("CAPTURE"), Some(Command::Events(vec![UiEvent::CaptureClicked])));
        assert_eq!(parse("r"), Some(Command::Events(vec![UiEvent::RetryClicked])));
        assert_eq!(parse("status"), Some(Command::Status));
        assert_eq!(parse("?"), Some(Command::Help));
        assert_eq!(parse("exit"), Some(Command::Quit));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse("   "), None);
        assert_eq!(parse("snap now"), Some(Command::Unknown("snap".to_string())));
    }
}
