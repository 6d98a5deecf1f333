
macro_rules! quiz_command_prefix {
    () => ({
        use std::io::Write;
        print!("Learniverse> ");
        let _ = std::io::stdout().flush();
    });
}

macro_rules! quiz_print {
    ($($arg:tt)*) => ({
        println!();
        println!($($arg)*);
        quiz_command_prefix!();
    })
}
