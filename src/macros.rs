macro_rules! paint {
    ($stream:ident, $colour:ident, $($arg:tt)*) => (
        {
            use ansi_term::Colour;
            use atty::Stream;
            let text = format!($($arg)*);
            if atty::is(Stream::$stream) {
                Colour::$colour.bold().paint(text).to_string()
            } else {
                text
            }
        }
    )
}

#[allow(unused_macros)]
macro_rules! green {
    ($($arg:tt)*) => (paint!(Stdout, Green, $($arg)*))
}

#[allow(unused_macros)]
macro_rules! yellow {
    ($($arg:tt)*) => (paint!(Stdout, Yellow, $($arg)*))
}

#[allow(unused_macros)]
macro_rules! red {
    ($($arg:tt)*) => (paint!(Stdout, Red, $($arg)*))
}

#[allow(unused_macros)]
macro_rules! blue {
    ($($arg:tt)*) => (paint!(Stdout, Blue, $($arg)*))
}

// error and warning lines go to stderr, so they are colored based on stderr
macro_rules! format_err {
    ($($arg:tt)*) => (
        format!("{} {}", paint!(Stderr, Red, "error:"), format!($($arg)*))
    )
}

macro_rules! format_warn {
    ($($arg:tt)*) => (
        format!("{} {}", paint!(Stderr, Yellow, "warn:"), format!($($arg)*))
    )
}

macro_rules! format_note {
    ($($arg:tt)*) => (
        format!("{} {}", blue!("note:"), format!($($arg)*))
    )
}
