use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{self, parse::Parser, punctuated::Punctuated, Ident, Token};

/// This macro is added before a method of the `Round` struct in the impl block.
/// Use this macro to first check if the current game phase is one of the phases
/// in the attribute.
///
/// For example, `#[allowed_phase(Betting, Complete)]` will make a method first
/// check if `self.phase` is `GamePhase::Betting` or `GamePhase::Complete`. If not,
/// the method returns `EngineError::WrongPhase` without touching any state.
///
/// Both `GamePhase` and `EngineError` must be in scope where the macro is used.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let mut ast: syn::ImplItemFn = match syn::parse(item) {
        Ok(ast) => ast,
        Err(err) => return err.to_compile_error().into(),
    };
    let phases = match Punctuated::<Ident, Token![,]>::parse_terminated.parse(attr) {
        Ok(phases) => phases,
        Err(err) => return err.to_compile_error().into(),
    };
    if phases.is_empty() {
        return syn::Error::new_spanned(&ast.sig.ident, "allowed_phase needs at least one phase")
            .to_compile_error()
            .into();
    }

    let function_name = ast.sig.ident.to_string();
    let allowed = phases
        .iter()
        .map(|phase| phase.to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    let patterns = phases.iter();
    let guard: TokenStream = quote! {
        if !matches!(self.phase, #(GamePhase::#patterns)|*) {
            return Err(EngineError::WrongPhase {
                action: #function_name,
                allowed: #allowed,
                current: self.phase,
            });
        }
    };
    let early_return: syn::Stmt = match syn::parse2(guard) {
        Ok(stmt) => stmt,
        Err(err) => return err.to_compile_error().into(),
    };
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}
