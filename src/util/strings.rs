use std::fmt::Display;

/// Appends `key=value` to `dst`, separated by ", " when `dst` is non-empty.
pub fn append_key_value<V: Display>(dst: &mut String, key: &str, value: V) {
    if !dst.is_empty() {
        dst.push_str(", ");
    }
    dst.push_str(key);
    dst.push('=');
    dst.push_str(&value.to_string());
}

#[cfg(test)]
mod test {
    use super::append_key_value;

    #[test]
    fn key_value_chain() {
        let mut out = String::new();
        append_key_value(&mut out, "requests", 2);
        assert_eq!("requests=2", out);
        append_key_value(&mut out, "regions", 17);
        assert_eq!("requests=2, regions=17", out);
    }
}
