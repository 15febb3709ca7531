//! PIN / passphrase 输入
//!
//! 设备只显示打乱的 3x3 键盘，user按主机侧键盘上对应的位置输入。
//! 空字符串表示user放弃输入。

use std::fmt;
use std::io::{self, BufRead, Write};
use zeroize::Zeroizing;

/// 需要输入的秘密类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Pin,
    Passphrase,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Pin => write!(f, "PIN"),
            EntryKind::Passphrase => write!(f, "passphrase"),
        }
    }
}

/// 向user询问 PIN 或 passphrase
pub trait PinEntry {
    /// 返回空字符串表示放弃
    fn ask(&mut self, kind: EntryKind) -> Zeroizing<String>;
}

impl<E: PinEntry + ?Sized> PinEntry for &mut E {
    fn ask(&mut self, kind: EntryKind) -> Zeroizing<String> {
        (**self).ask(kind)
    }
}

impl<E: PinEntry + ?Sized> PinEntry for Box<E> {
    fn ask(&mut self, kind: EntryKind) -> Zeroizing<String> {
        (**self).ask(kind)
    }
}

/// 键盘位置（与设备屏幕上的 3x3 网格对应）
const KEYPAD: &str = "\
+---+---+---+
| 7 | 8 | 9 |
+---+---+---+
| 4 | 5 | 6 |
+---+---+---+
| 1 | 2 | 3 |
+---+---+---+";

/// 基于 stdin/stdout 的输入
pub struct ConsoleEntry<R, W> {
    input: R,
    output: W,
}

impl ConsoleEntry<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleEntry<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, kind: EntryKind) -> io::Result<Zeroizing<String>> {
        match kind {
            EntryKind::Pin => write!(self.output, "\n{}\n\nPIN? ", KEYPAD)?,
            EntryKind::Passphrase => write!(self.output, "Passphrase? ")?,
        }
        self.output.flush()?;

        let mut line = Zeroizing::new(String::new());
        self.input.read_line(&mut line)?;
        writeln!(self.output)?;

        let answer = match kind {
            EntryKind::Pin => line.trim(),
            // passphrase 中的空白有意义，只去掉行尾换行
            EntryKind::Passphrase => line.trim_end_matches(&['\r', '\n'][..]),
        };
        Ok(Zeroizing::new(answer.to_string()))
    }
}

impl<R: BufRead, W: Write> PinEntry for ConsoleEntry<R, W> {
    fn ask(&mut self, kind: EntryKind) -> Zeroizing<String> {
        // 终端不可用时按放弃处理
        self.prompt(kind).unwrap_or_else(|e| {
            tracing::warn!("读取 {} 输入failed: {}", kind, e);
            Zeroizing::new(String::new())
        })
    }
}
