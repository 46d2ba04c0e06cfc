use cql_lexer::LexError;

fn main() -> Result<(), LexError> {
    let input = "load people; select #name, @x from people where #age >= 21 order by #age desc;";
    for command in cql_lexer::tokenize(input)? {
        println!("{:#?}", command.tokens);
    }
    Ok(())
}
