pub mod chamado;
pub mod status;
pub mod usuario;

pub use chamado::{
    Chamado, Comentario, EntradaHistorico, EstadoTimer, Intervalo, NovoChamado,
    NovoChamadoValido, TimerUsuario,
};
pub use status::{Prioridade, StatusChamado};
pub use usuario::{Acesso, Perfil, Usuario};
