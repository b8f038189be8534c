//! User-facing reply texts (Telegram HTML) and message splitting.

use crate::{
    config::AuthorInfo,
    domain::{ActivityEntry, CompanyInfo, TaxId},
};

pub const START_TEXT: &str =
    "Здравствуйте! Для получения информации о работе с ботом используйте команду /help.";

pub const HELP_TEXT: &str = "<b><u>Меню бота</u></b>:\n\
/start – начать общение с ботом;\n\
/help – получить справку о доступных командах;\n\
/hello – получить информацию о создателе бота;\n\
/inn – получить наименования и адреса компаний по ИНН;\n\
/okved – получить информацию о видах деятельности компании, отсортированных в обратном алфавитном порядке;\n\
/egrul – получить выписку из ЕГРЮЛ по ИНН компании;\n\
/last – повторить последнее действие бота.";

pub const UNKNOWN_COMMAND_TEXT: &str = "Неизвестная команда, попробуйте ещё раз";
pub const TEXT_ONLY_TEXT: &str = "Поддерживаются только текстовые сообщения";
pub const NO_PRIOR_COMMAND_TEXT: &str = "Вы еще не ввели ни одной валидной команды!";
pub const MISSING_TAX_ID_TEXT: &str = "Введите как минимум один ИНН";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn hello_html(author: &AuthorInfo) -> String {
    let mut lines = vec!["<b><u>Информация об авторе</u></b>:".to_string()];
    if let Some(name) = &author.name {
        lines.push(format!("Имя: {}", escape_html(name)));
    }
    if let Some(email) = &author.email {
        lines.push(format!("E-mail: {}", escape_html(email)));
    }
    if let Some(url) = &author.url {
        lines.push(format!("Ссылка: {}", escape_html(url)));
    }
    if lines.len() == 1 {
        lines.push("Сведения об авторе не указаны".to_string());
    }
    lines.join("\n")
}

pub fn invalid_tax_id_html(arg: &str) -> String {
    format!("Строка \"{}\" не является валидным ИНН", escape_html(arg))
}

pub fn company_not_found_html(tax_id: &TaxId) -> String {
    format!("Компания с ИНН \"{tax_id}\" не найдена")
}

pub fn company_html(tax_id: &TaxId, info: &CompanyInfo) -> String {
    format!(
        "<b>Информация о компании с ИНН \"{tax_id}\":</b>\n\
Наименование компании: {}\n\
Юридический адрес: {}",
        escape_html(&info.name),
        escape_html(&info.address)
    )
}

/// Renders activities in the order given; callers sort first.
pub fn activities_html(tax_id: &TaxId, activities: &[ActivityEntry]) -> String {
    let lines = activities
        .iter()
        .map(|a| format!("{} {}", escape_html(&a.code), escape_html(&a.activity_type)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("<b>Список видов деятельности компании с ИНН \"{tax_id}\":</b>\n{lines}")
}

pub fn document_file_name(tax_id: &TaxId) -> String {
    format!("{tax_id}.pdf")
}

/// Split text into chunks of at most `limit` bytes, breaking on line boundaries.
///
/// Every reply keeps its tags within a single line, so line-based chunks stay
/// balanced. A single line longer than `limit` is cut at a char boundary.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut out: Vec<String> = Vec::new();
    let mut chunk = String::new();

    for line in text.split('\n') {
        let sep = usize::from(!chunk.is_empty());
        if chunk.len() + sep + line.len() <= limit {
            if sep == 1 {
                chunk.push('\n');
            }
            chunk.push_str(line);
            continue;
        }

        if !chunk.is_empty() {
            out.push(std::mem::take(&mut chunk));
        }

        let mut rest = line;
        while rest.len() > limit {
            let (head, tail) = split_utf8_prefix(rest, limit);
            out.push(head.to_string());
            rest = tail;
        }
        chunk.push_str(rest);
    }

    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}

fn split_utf8_prefix(s: &str, max_bytes: usize) -> (&str, &str) {
    if s.len() <= max_bytes {
        return (s, "");
    }
    let mut idx = max_bytes;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    if idx == 0 {
        // A single char wider than the limit; emit it whole rather than loop.
        let next = s.char_indices().nth(1).map(|(i, _)| i).unwrap_or(s.len());
        return (&s[..next], &s[next..]);
    }
    (&s[..idx], &s[idx..])
}
