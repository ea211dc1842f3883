//! 环形缓冲区 - 用于保存矿工输出

use std::collections::VecDeque;

/// 固定大小的环形缓冲区
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// 创建指定容量的环形缓冲区
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// 添加元素，如果已满则移除最旧的
    pub fn push(&mut self, value: T) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(value);
    }

    /// 当前元素数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 清空缓冲区
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// 获取最新的值
    #[cfg(test)]
    pub fn latest(&self) -> Option<&T> {
        self.data.back()
    }

    /// 迭代器
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

/// 输出来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
    /// 启动器自身的提示
    System,
}

/// 一行输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

/// 矿工输出日志（只追加，满了丢弃最旧的行）
#[derive(Debug, Clone)]
pub struct OutputLog {
    lines: RingBuffer<OutputLine>,
    /// 被丢弃的行数
    dropped: usize,
}

impl OutputLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: RingBuffer::new(capacity),
            dropped: 0,
        }
    }

    /// 追加一行
    pub fn push(&mut self, stream: OutputStream, text: impl Into<String>) {
        if self.lines.len() == self.lines.capacity() {
            self.dropped += 1;
        }
        self.lines.push(OutputLine {
            stream,
            text: text.into(),
        });
    }

    /// 追加启动器提示
    pub fn push_system(&mut self, text: impl Into<String>) {
        self.push(OutputStream::System, text);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.dropped = 0;
    }

    pub fn lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.lines.iter()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&OutputLine> {
        self.lines.latest()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 所有行拼成一段文本
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in self.lines.iter() {
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer() {
        let mut buf: RingBuffer<i32> = RingBuffer::new(3);

        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        buf.push(4);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(buf.latest(), Some(&4));

        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut buf = RingBuffer::new(0);
        buf.push("a");
        buf.push("b");
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.latest(), Some(&"b"));
    }

    #[test]
    fn test_output_log() {
        let mut log = OutputLog::new(2);

        log.push(OutputStream::Stdout, "hashrate 1");
        log.push(OutputStream::Stderr, "warn");
        log.push_system("stopped");

        assert_eq!(log.len(), 2);
        assert_eq!(log.dropped(), 1);
        assert_eq!(log.text(), "warn\nstopped\n");
        assert_eq!(log.last().unwrap().stream, OutputStream::System);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.dropped(), 0);
    }
}
