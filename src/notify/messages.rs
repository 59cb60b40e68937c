use time::Duration;

pub fn registration_code(code: &str, valid_for: Duration) -> String {
    format!(
        "Your WAHIRE verification code is {code}. It expires in {}.",
        validity(valid_for)
    )
}

pub fn resend_code(code: &str, valid_for: Duration) -> String {
    format!(
        "Your new WAHIRE verification code is {code}. It expires in {}. \
         Earlier codes no longer work.",
        validity(valid_for)
    )
}

// whole minutes, rounded up; sub-minute windows are given in seconds
fn validity(valid_for: Duration) -> String {
    let secs = valid_for.whole_seconds().max(0);
    match secs {
        1 => "1 second".into(),
        0..=59 => format!("{secs} seconds"),
        _ => match (secs + 59) / 60 {
            1 => "1 minute".into(),
            mins => format!("{mins} minutes"),
        },
    }
}

pub fn welcome(name: &str) -> String {
    format!("Welcome to WAHIRE, {name}! Your phone number has been verified.")
}
