//! Instruction Set
//!
//! Maps source characters to instructions. This file contains no execution
//! semantics. Character assignments are part of the language and must not
//! change.

/// One instruction, identified by the character that starts it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // Literals
    Zero,
    Digits,
    Word,
    CharLiteral,
    StringLiteral,
    OutputLiteral,
    ParenLiteral,

    // Arithmetic and comparison
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Compare,
    Not,

    // Frames
    OpenFrame,
    OpenArray,
    CloseFrame,

    // Stack
    Print,
    Dup,
    Discard,

    // Variables
    SetVar,
    GetVar,

    // Arrays
    Gather,
    Spread,
    IndexGet,
    IndexSet,
    IndexDelete,

    // Control flow
    LoopHead,
    LoopTail,
    Break,

    // Declared, not implemented
    Call,
    Map,

    // Stray `)` outside a paren literal
    CloseParen,

    // Whitespace and unrecognized characters
    Nop,
}

impl Instruction {
    /// Classify the character that starts a unit
    pub fn from_char(c: char) -> Self {
        match c {
            '0' => Instruction::Zero,
            '1'..='9' => Instruction::Digits,
            'a'..='z' | 'A'..='Z' => Instruction::Word,
            '\'' => Instruction::CharLiteral,
            '"' => Instruction::StringLiteral,
            '`' => Instruction::OutputLiteral,
            '(' => Instruction::ParenLiteral,

            '+' => Instruction::Add,
            '-' => Instruction::Sub,
            '*' => Instruction::Mul,
            '/' => Instruction::Div,
            '%' => Instruction::Mod,
            '?' => Instruction::Compare,
            '~' => Instruction::Not,

            '[' => Instruction::OpenFrame,
            '|' => Instruction::OpenArray,
            ']' => Instruction::CloseFrame,

            '.' => Instruction::Print,
            ':' => Instruction::Dup,
            '_' => Instruction::Discard,

            '=' => Instruction::SetVar,
            '^' => Instruction::GetVar,

            '>' => Instruction::Gather,
            '<' => Instruction::Spread,
            ',' => Instruction::IndexGet,
            ';' => Instruction::IndexSet,
            '$' => Instruction::IndexDelete,

            '{' => Instruction::LoopHead,
            '}' => Instruction::LoopTail,
            '!' => Instruction::Break,

            '@' => Instruction::Call,
            '#' => Instruction::Map,

            ')' => Instruction::CloseParen,

            _ => Instruction::Nop,
        }
    }
}
