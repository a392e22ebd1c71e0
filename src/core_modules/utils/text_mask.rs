// Terminal rendering of a foreground mask: one grid row per line, `0 ` for
// foreground and `. ` for background.

pub fn render(mask: &[bool], width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(mask.len() * 2 + mask.len() / width);
    for row in mask.chunks(width) {
        for &foreground in row {
            out.push_str(if foreground { "0 " } else { ". " });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rows_in_order() {
        let mask = [true, false, false, false, true, true];
        assert_eq!(render(&mask, 3), "0 . . \n. 0 0 \n");
    }

    #[test]
    fn empty_mask_renders_nothing() {
        assert_eq!(render(&[], 8), "");
    }
}
