pub trait Appendable {
    fn append_str(&mut self, s: &str);
    fn append_i64(&mut self, i: i64);
    fn append_f64(&mut self, f: f64);
    fn append_bool(&mut self, b: bool);
    fn append_padded(&mut self, s: &str, width: usize);
}

impl Appendable for String {
    fn append_str(&mut self, s: &str) {
        self.push_str(s);
    }
    fn append_i64(&mut self, i: i64) {
        let mut buf = itoa::Buffer::new();
        self.push_str(buf.format(i));
    }
    fn append_f64(&mut self, f: f64) {
        let mut buf = ryu::Buffer::new();
        self.push_str(buf.format(f));
    }
    fn append_bool(&mut self, b: bool) {
        self.push_str(if b { "true" } else { "false" });
    }
    fn append_padded(&mut self, s: &str, width: usize) {
        self.push_str(s);
        let len = s.chars().count();
        if len < width {
            self.extend(std::iter::repeat_n(' ', width - len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_use_shortest_round_trip_form() {
        let mut s = String::new();
        s.append_i64(-42);
        s.append_str(" ");
        s.append_f64(0.1);
        s.append_str(" ");
        s.append_f64(2.0);
        assert_eq!(s, "-42 0.1 2.0");
    }

    #[test]
    fn padding_fills_to_width() {
        let mut s = String::new();
        s.append_padded("ab", 5);
        s.append_str("|");
        s.append_padded("abcdef", 3);
        assert_eq!(s, "ab   |abcdef");
    }
}
