macro_rules! emit {
    ($context:expr, $opcode:expr) => {
        $context.instruction(format!("{}", $opcode))
    };

    ($context:expr, $opcode:expr, $($format:tt)*) => {
        $context.instruction(format!("{:5}{}", $opcode, format_args!($($format)*)))
    };
}
