use std::io::{self, BufRead, Write};

pub fn prompt_confirm(prompt: &str, default: bool) -> io::Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    ask_yes_no(prompt, default, &mut stdin.lock(), &mut stdout)
}

fn ask_yes_no<R: BufRead, W: Write>(
    prompt: &str,
    default: bool,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    let mut line = String::new();

    loop {
        line.clear();
        write!(output, "{} ({}): ", prompt, hint)?;
        output.flush()?;

        // EOF behaves like an empty answer.
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(default);
        }

        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            "" => return Ok(default),
            _ => continue,
        }
    }
}
